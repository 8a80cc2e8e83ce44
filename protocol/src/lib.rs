//! Wire codec for the Minecraft server list ping and query protocols.
//!
//! Nothing in this crate performs I/O. Requests are built into byte vectors and
//! responses are parsed from byte slices, so every function here is a pure
//! function of its input.

use std::{
    io::{Read, Write},
    num::ParseIntError,
};

use thiserror::Error;

pub mod chat;
pub mod fields;
pub mod frame;
pub mod info;
pub mod ping;
pub mod query;
pub mod tokens;

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("could not write to encoding buffer")]
    Write(#[from] std::io::Error),

    #[error("could not write field '{name}'")]
    Field {
        name: &'static str,
        #[source]
        source: Box<EncodingError>,
    },

    #[error("'{name}' is {length} bytes long, at most {max} bytes can be framed")]
    TooLong {
        name: &'static str,
        length: usize,
        max: usize,
    },

    #[error("challenge token {0} cannot be sent")]
    InvalidChallengeToken(i32),
}

#[derive(Debug, Error)]
pub enum DecodingError {
    #[error("could not read from decoding buffer")]
    Read(#[from] std::io::Error),

    #[error("var-int more than 5 bytes in length")]
    VarIntTooLarge,

    #[error("invalid packet id {0:#x}")]
    InvalidPacketId(i32),

    #[error("empty response")]
    EmptyResponse,

    #[error("truncated response (expected at least {expected} bytes, got {actual})")]
    TruncatedResponse { expected: usize, actual: usize },

    #[error("malformed status payload")]
    MalformedPayload(#[source] serde_json::Error),

    #[error("challenge token '{token}' is not a decimal number")]
    ChallengeDecode {
        token: String,
        #[source]
        source: ParseIntError,
    },
}

pub trait Encodable {
    fn encode(&self, w: impl Write) -> Result<(), EncodingError>;
}

pub trait Decodable: Sized {
    fn decode(r: impl Read) -> Result<Self, DecodingError>;
}

pub trait Encoder {
    type Input;

    fn encode(value: Self::Input, w: impl Write) -> Result<(), EncodingError>;
}

pub trait Decoder {
    type Output;

    fn decode(r: impl Read) -> Result<Self::Output, DecodingError>;
}

/// Lowercase hex rendering of a packet, used when tracing wire traffic.
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}
