//! Server list ping: handshake construction and status response parsing.

use std::io::Cursor;

use log::trace;

use crate::{
    fields::{int::Endian, varint::VarIntEncoder},
    frame::{write_packet, Field},
    hex,
    info::PingStatus,
    Decoder, DecodingError, EncodingError,
};

/// Handshake packet id followed by protocol version 4.
pub const HANDSHAKE_MARKER: [u8; 2] = [0x00, 0x04];

/// Next-state value asking the server for its status.
pub const NEXT_STATE_STATUS: u8 = 0x01;

/// Status request packet (length 1, packet id 0), sent after the handshake.
pub const STATUS_REQUEST: [u8; 2] = [0x01, 0x00];

/// Packet id of the status response.
pub const STATUS_RESPONSE_ID: i32 = 0x00;

/// Longest server address the handshake carries.
pub const MAX_ADDRESS_LENGTH: usize = 255;

/// Outer length, packet id and payload length, one byte each at minimum.
pub const PING_MIN_HEADER: usize = 3;

/// Builds the handshake envelope followed by the status request.
pub fn build_ping_request(address: &str, port: u16) -> Result<Vec<u8>, EncodingError> {
    if address.len() > MAX_ADDRESS_LENGTH {
        return Err(EncodingError::TooLong {
            name: "server_address",
            length: address.len(),
            max: MAX_ADDRESS_LENGTH,
        });
    }

    let handshake = write_packet(&[
        Field::Raw(&HANDSHAKE_MARKER),
        Field::Text(address),
        Field::U16(port, Endian::Big),
        Field::U8(NEXT_STATE_STATUS),
    ])?;

    let packet = write_packet(&[Field::Prefixed(&handshake), Field::Raw(&STATUS_REQUEST)])?;
    trace!("built ping request: {}", hex(&packet));

    Ok(packet)
}

/// Parses a status response frame into a [`PingStatus`].
pub fn parse_ping_response(raw: &[u8]) -> Result<PingStatus, DecodingError> {
    if raw.len() < PING_MIN_HEADER {
        return Err(DecodingError::EmptyResponse);
    }

    let payload = status_payload(raw)?;
    serde_json::from_slice(payload).map_err(DecodingError::MalformedPayload)
}

/// Returns the JSON payload of a status response frame, skipping exactly the
/// encoded outer length, packet id and payload length.
pub fn status_payload(raw: &[u8]) -> Result<&[u8], DecodingError> {
    let mut cursor = Cursor::new(raw);

    VarIntEncoder::decode(&mut cursor)?;

    let id = VarIntEncoder::decode(&mut cursor)?;
    if id != STATUS_RESPONSE_ID {
        return Err(DecodingError::InvalidPacketId(id));
    }

    let length = VarIntEncoder::decode(&mut cursor)?;
    let length = usize::try_from(length).map_err(|_| DecodingError::VarIntTooLarge)?;

    let start = cursor.position() as usize;
    let available = raw.len().saturating_sub(start);
    if available < length {
        return Err(DecodingError::TruncatedResponse {
            expected: length,
            actual: available,
        });
    }

    Ok(&raw[start..start + length])
}

/// Whether `buffer` starts with a complete var-int length-prefixed frame.
/// A prefix too long to be a var-int also counts, there is nothing more to wait for.
pub fn frame_complete(buffer: &[u8]) -> bool {
    let mut cursor = Cursor::new(buffer);
    match VarIntEncoder::decode(&mut cursor) {
        Ok(length) => match usize::try_from(length) {
            Ok(length) => buffer.len() >= cursor.position() as usize + length,
            Err(_) => true,
        },
        Err(DecodingError::VarIntTooLarge) => true,
        Err(_) => false,
    }
}
