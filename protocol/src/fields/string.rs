use std::io::Read;

use crate::{Decodable, Decoder, Encodable, Encoder, EncodingError};

use super::varint::VarIntEncoder;

/// Writes `bytes` behind a var-int length prefix. Lengths below 128 take a
/// single byte holding the raw count.
pub fn encode_prefixed(bytes: &[u8], mut w: impl std::io::Write) -> Result<(), EncodingError> {
    let length = i32::try_from(bytes.len()).map_err(|_| EncodingError::TooLong {
        name: "length",
        length: bytes.len(),
        max: i32::MAX as usize,
    })?;

    VarIntEncoder::encode(length, &mut w).map_err(|e| EncodingError::Field {
        name: "length",
        source: Box::new(e),
    })?;

    w.write_all(bytes).map_err(EncodingError::Write)?;

    Ok(())
}

impl Encodable for &'_ str {
    fn encode(&self, w: impl std::io::Write) -> Result<(), EncodingError> {
        encode_prefixed(self.as_bytes(), w)
    }
}

impl Decodable for String {
    fn decode(mut r: impl Read) -> Result<Self, crate::DecodingError> {
        let length = VarIntEncoder::decode(&mut r)?;
        let length = usize::try_from(length).map_err(|_| crate::DecodingError::VarIntTooLarge)?;

        let mut buf = Vec::new();
        r.take(length as u64).read_to_end(&mut buf)?;
        if buf.len() < length {
            return Err(crate::DecodingError::TruncatedResponse {
                expected: length,
                actual: buf.len(),
            });
        }

        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_the_raw_length_byte() {
        let mut buf = Vec::new();
        "localhost".encode(&mut buf).unwrap();
        assert_eq!(buf[0], 9);
        assert_eq!(&buf[1..], b"localhost");
    }

    #[test]
    fn long_strings_get_a_multi_byte_prefix() {
        let text = "a".repeat(200);
        let mut buf = Vec::new();
        text.as_str().encode(&mut buf).unwrap();
        assert_eq!(&buf[..2], [0xc8, 0x01]);
        assert_eq!(buf.len(), 202);
        assert_eq!(String::decode(&buf[..]).unwrap(), text);
    }

    #[test]
    fn short_string_is_truncated() {
        let bytes = [0x05, b'a', b'b'];
        assert!(matches!(
            String::decode(&bytes[..]),
            Err(crate::DecodingError::TruncatedResponse {
                expected: 5,
                actual: 2
            })
        ));
    }
}
