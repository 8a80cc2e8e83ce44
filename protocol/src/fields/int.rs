use std::marker::PhantomData;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use paste::paste;

use crate::{Decodable, Encodable, Encoder};

/// Byte order of a fixed-width integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

/// Writes integers in little-endian order. Plain [`Encodable`] integers are
/// always big-endian, as the protocol mostly is.
pub struct LittleEndianEncoder<T>(PhantomData<T>);

macro_rules! impl_int {
    ($($typ:ident)+) => {
        $(paste! {
            impl Encodable for $typ {
                fn encode(&self, mut w: impl std::io::Write) -> Result<(), crate::EncodingError> {
                    w.[<write_ $typ>]::<BigEndian>(*self).map_err(crate::EncodingError::Write)
                }
            }

            impl Decodable for $typ {
                fn decode(mut r: impl std::io::Read) -> Result<Self, crate::DecodingError> {
                    r.[<read_ $typ>]::<BigEndian>().map_err(crate::DecodingError::Read)
                }
            }

            impl Encoder for LittleEndianEncoder<$typ> {
                type Input = $typ;

                fn encode(value: $typ, mut w: impl std::io::Write) -> Result<(), crate::EncodingError> {
                    w.[<write_ $typ>]::<LittleEndian>(value).map_err(crate::EncodingError::Write)
                }
            }
       })+
    };
}

impl_int!(u16 i16 u32 i32);

impl Encodable for u8 {
    fn encode(&self, mut w: impl std::io::Write) -> Result<(), crate::EncodingError> {
        w.write_u8(*self).map_err(crate::EncodingError::Write)
    }
}

impl Decodable for u8 {
    fn decode(mut r: impl std::io::Read) -> Result<Self, crate::DecodingError> {
        r.read_u8().map_err(crate::DecodingError::Read)
    }
}
