use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::{Decoder, DecodingError, Encoder, EncodingError};

/// Longest encoding of an `i32` var-int.
pub const MAX_VARINT_LENGTH: usize = 5;

pub struct VarIntEncoder;

impl VarIntEncoder {
    /// Number of bytes `value` occupies once encoded.
    pub fn encoded_len(value: i32) -> usize {
        let mut value = value as u32;
        let mut length = 1;
        while value >= 0x80 {
            value >>= 7;
            length += 1;
        }
        length
    }
}

impl Encoder for VarIntEncoder {
    type Input = i32;

    fn encode(value: Self::Input, mut w: impl std::io::Write) -> Result<(), EncodingError> {
        let mut value = value as u32;

        loop {
            let part = value as u8;
            value >>= 7;
            if value == 0 {
                w.write_u8(part & 0x7f)?;
                break Ok(());
            } else {
                w.write_u8(part | 0x80)?;
            }
        }
    }
}

impl Decoder for VarIntEncoder {
    type Output = i32;

    fn decode(mut r: impl std::io::Read) -> Result<Self::Output, DecodingError> {
        let mut value = 0;
        let mut length = 0;

        loop {
            let byte = r.read_u8()?;
            value |= ((byte & 0x7f) as u32) << (length * 7);
            length += 1;

            if (byte & 0x80) == 0 {
                break Ok(value as i32);
            }

            if length >= MAX_VARINT_LENGTH {
                break Err(DecodingError::VarIntTooLarge);
            }
        }
    }
}
