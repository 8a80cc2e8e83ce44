//! Assembly of outbound packets from an ordered list of fields.

use std::io::Write;

use crate::{
    fields::{
        int::{Endian, LittleEndianEncoder},
        string::encode_prefixed,
    },
    Encodable, Encoder, EncodingError,
};

/// One field of an outbound packet, written in list order.
#[derive(Debug, Clone, Copy)]
pub enum Field<'a> {
    /// Literal bytes, written as-is.
    Raw(&'a [u8]),
    U8(u8),
    U16(u16, Endian),
    I32(i32, Endian),
    U32(u32, Endian),
    /// Text behind a var-int length prefix.
    Text(&'a str),
    /// Bytes behind a var-int length prefix.
    Prefixed(&'a [u8]),
}

impl Encodable for Field<'_> {
    fn encode(&self, mut w: impl Write) -> Result<(), EncodingError> {
        match *self {
            Field::Raw(bytes) => w.write_all(bytes).map_err(EncodingError::Write),
            Field::U8(value) => value.encode(w),
            Field::U16(value, Endian::Big) => value.encode(w),
            Field::U16(value, Endian::Little) => LittleEndianEncoder::<u16>::encode(value, w),
            Field::I32(value, Endian::Big) => value.encode(w),
            Field::I32(value, Endian::Little) => LittleEndianEncoder::<i32>::encode(value, w),
            Field::U32(value, Endian::Big) => value.encode(w),
            Field::U32(value, Endian::Little) => LittleEndianEncoder::<u32>::encode(value, w),
            Field::Text(text) => encode_prefixed(text.as_bytes(), w),
            Field::Prefixed(bytes) => encode_prefixed(bytes, w),
        }
    }
}

/// Encodes `fields` back to back into a fresh buffer.
pub fn write_packet(fields: &[Field]) -> Result<Vec<u8>, EncodingError> {
    let mut buf = Vec::new();
    for field in fields {
        field.encode(&mut buf)?;
    }
    Ok(buf)
}
