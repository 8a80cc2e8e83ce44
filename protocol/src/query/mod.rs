//! Query protocol: challenge handshake and full-stat request over UDP.

use std::{fmt, io::Cursor};

use log::{trace, warn};

use crate::{
    fields::int::Endian,
    frame::{write_packet, Field},
    hex, Decodable, DecodingError, EncodingError,
};

pub use self::status::{
    GameInfo, HostInfo, Plugin, QueryPlayerInfo, QueryStatus, ServerInfo, ServerVersion,
};

pub mod stat;
pub mod status;

pub const MAGIC: [u8; 2] = [0xfe, 0xfd];

pub const PACKET_TYPE_CHALLENGE: u8 = 0x09;
pub const PACKET_TYPE_STAT: u8 = 0x00;

/// Session id of the first query on a connection.
pub const SESSION_ID: u32 = 1;

/// Servers only keep the low nibble of every session id byte.
pub const SESSION_MASK: u32 = 0x0f0f0f0f;

/// Trailing padding that turns a basic stat request into a full one.
pub const FULL_STAT_PADDING: [u8; 4] = [0x00; 4];

/// Packet type and session id echo.
pub const CHALLENGE_HEADER_LENGTH: usize = 5;

/// Packet type, session id echo and the `splitnum\0\x80\0` padding.
pub const STAT_HEADER_LENGTH: usize = 16;

/// Smallest payload accepted after the stat header.
pub const STAT_MIN_PAYLOAD: usize = 5;

/// Token handed out by the server in reply to a challenge request. Zero is
/// never a real token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChallengeToken(i32);

impl ChallengeToken {
    pub fn new(value: i32) -> ChallengeToken {
        ChallengeToken(value)
    }

    pub fn get(self) -> i32 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for ChallengeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The session id that follows `session`, never zero and always within
/// [`SESSION_MASK`].
pub fn next_session_id(session: u32) -> u32 {
    // Setting the masked-out bits lets the carry skip over them.
    match (session | !SESSION_MASK).wrapping_add(1) & SESSION_MASK {
        0 => SESSION_ID,
        next => next,
    }
}

pub fn build_challenge_request() -> Vec<u8> {
    build_session_challenge(SESSION_ID)
}

pub fn build_session_challenge(session: u32) -> Vec<u8> {
    let mut packet = Vec::with_capacity(7);
    packet.extend_from_slice(&MAGIC);
    packet.push(PACKET_TYPE_CHALLENGE);
    packet.extend_from_slice(&session.to_be_bytes());
    trace!("built challenge request: {}", hex(&packet));
    packet
}

/// Parses the decimal token out of a challenge response.
pub fn parse_challenge_response(raw: &[u8]) -> Result<ChallengeToken, DecodingError> {
    if raw.len() < CHALLENGE_HEADER_LENGTH {
        return Err(DecodingError::TruncatedResponse {
            expected: CHALLENGE_HEADER_LENGTH,
            actual: raw.len(),
        });
    }

    check_header(raw, PACKET_TYPE_CHALLENGE);

    let mut text = &raw[CHALLENGE_HEADER_LENGTH..];
    while let [rest @ .., 0] = text {
        text = rest;
    }

    let text = String::from_utf8_lossy(text);
    text.parse::<i32>()
        .map(ChallengeToken)
        .map_err(|source| DecodingError::ChallengeDecode {
            token: text.to_string(),
            source,
        })
}

/// Builds a full-stat request. A zero token is refused, the server would only
/// ignore the request.
pub fn build_full_stat_request(token: ChallengeToken) -> Result<Vec<u8>, EncodingError> {
    build_session_full_stat(SESSION_ID, token)
}

pub fn build_session_full_stat(
    session: u32,
    token: ChallengeToken,
) -> Result<Vec<u8>, EncodingError> {
    if !token.is_valid() {
        return Err(EncodingError::InvalidChallengeToken(token.get()));
    }

    let packet = write_packet(&[
        Field::Raw(&MAGIC),
        Field::U8(PACKET_TYPE_STAT),
        Field::U32(session, Endian::Big),
        Field::I32(token.get(), Endian::Big),
        Field::Raw(&FULL_STAT_PADDING),
    ])?;

    trace!("built full stat request: {}", hex(&packet));
    Ok(packet)
}

/// Parses a full-stat datagram, header included.
pub fn parse_full_stat_response(raw: &[u8]) -> Result<QueryStatus, DecodingError> {
    let expected = STAT_HEADER_LENGTH + STAT_MIN_PAYLOAD;
    if raw.len() < expected {
        return Err(DecodingError::TruncatedResponse {
            expected,
            actual: raw.len(),
        });
    }

    check_header(raw, PACKET_TYPE_STAT);

    Ok(stat::parse_stat_payload(&raw[STAT_HEADER_LENGTH..]))
}

/// Whether `raw` is a `packet_type` reply echoing `session`. Anything else is
/// a stray or late datagram.
pub fn is_reply_to(raw: &[u8], packet_type: u8, session: u32) -> bool {
    matches!(
        read_header(raw),
        Some((kind, echo)) if kind == packet_type && echo == session
    )
}

fn read_header(raw: &[u8]) -> Option<(u8, u32)> {
    let mut cursor = Cursor::new(raw);
    let kind = u8::decode(&mut cursor).ok()?;
    let session = u32::decode(&mut cursor).ok()?;
    Some((kind, session))
}

fn check_header(raw: &[u8], packet_type: u8) {
    if let Some((kind, _)) = read_header(raw) {
        if kind != packet_type {
            warn!("unexpected query packet type {kind:#04x} (expected {packet_type:#04x})");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_request_bytes() {
        assert_eq!(
            build_challenge_request(),
            [0xfe, 0xfd, 0x09, 0x00, 0x00, 0x00, 0x01]
        );
    }

    #[test]
    fn challenge_with_two_byte_terminator() {
        let token = parse_challenge_response(b"\x00\x00\x00\x00\x0012345\x00\x00").unwrap();
        assert_eq!(token.get(), 12345);
        assert!(token.is_valid());
    }

    #[test]
    fn challenge_with_single_terminator() {
        let token = parse_challenge_response(b"\x09\x00\x00\x00\x019513307\x00").unwrap();
        assert_eq!(token, ChallengeToken::new(9513307));
    }

    #[test]
    fn negative_challenge() {
        let token = parse_challenge_response(b"\x09\x00\x00\x00\x01-42\x00").unwrap();
        assert_eq!(token.get(), -42);
    }

    #[test]
    fn zero_challenge_parses_but_is_not_valid() {
        let token = parse_challenge_response(b"\x00\x00\x00\x00\x000").unwrap();
        assert!(!token.is_valid());
        assert!(matches!(
            build_full_stat_request(token),
            Err(EncodingError::InvalidChallengeToken(0))
        ));
    }

    #[test]
    fn non_decimal_challenge() {
        assert!(matches!(
            parse_challenge_response(b"\x09\x00\x00\x00\x0112a45\x00"),
            Err(DecodingError::ChallengeDecode { .. })
        ));
        assert!(matches!(
            parse_challenge_response(b"\x09\x00\x00\x00\x01"),
            Err(DecodingError::ChallengeDecode { .. })
        ));
    }

    #[test]
    fn short_challenge_is_truncated() {
        assert!(matches!(
            parse_challenge_response(b"\x09\x00"),
            Err(DecodingError::TruncatedResponse {
                expected: 5,
                actual: 2
            })
        ));
    }

    #[test]
    fn full_stat_request_bytes() {
        let packet = build_full_stat_request(ChallengeToken::new(9513307)).unwrap();
        assert_eq!(
            packet,
            [0xfe, 0xfd, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x91, 0x29, 0x5b, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn session_requests_carry_the_session() {
        assert_eq!(
            build_session_challenge(0x0102),
            [0xfe, 0xfd, 0x09, 0x00, 0x00, 0x01, 0x02]
        );

        let packet = build_session_full_stat(0x0102, ChallengeToken::new(7)).unwrap();
        assert_eq!(&packet[3..7], [0x00, 0x00, 0x01, 0x02]);
        assert_eq!(&packet[7..11], [0x00, 0x00, 0x00, 0x07]);
    }

    #[test]
    fn session_ids_stay_within_mask() {
        assert_eq!(next_session_id(0), 1);
        assert_eq!(next_session_id(1), 2);
        assert_eq!(next_session_id(0x0f), 0x0100);
        assert_eq!(next_session_id(0x0f0f), 0x010000);
        assert_eq!(next_session_id(SESSION_MASK), SESSION_ID);

        let mut session = SESSION_ID;
        for _ in 0..1000 {
            let next = next_session_id(session);
            assert_ne!(next, session);
            assert_ne!(next, 0);
            assert_eq!(next & !SESSION_MASK, 0);
            session = next;
        }
    }

    #[test]
    fn replies_match_type_and_session() {
        let reply = b"\x09\x00\x00\x00\x029513307\x00";

        assert!(is_reply_to(reply, PACKET_TYPE_CHALLENGE, 2));
        assert!(!is_reply_to(reply, PACKET_TYPE_CHALLENGE, 1));
        assert!(!is_reply_to(reply, PACKET_TYPE_STAT, 2));
        assert!(!is_reply_to(b"\x09\x00\x00", PACKET_TYPE_CHALLENGE, 0));
        assert!(!is_reply_to(b"", PACKET_TYPE_STAT, 0));
    }

    #[test]
    fn full_stat_needs_header_and_payload() {
        let raw = [0u8; STAT_HEADER_LENGTH + STAT_MIN_PAYLOAD - 1];
        assert!(matches!(
            parse_full_stat_response(&raw),
            Err(DecodingError::TruncatedResponse {
                expected: 21,
                actual: 20
            })
        ));
    }

    #[test]
    fn full_stat_response_with_header() {
        let mut raw = b"\x00\x00\x00\x00\x01splitnum\x00\x80\x00".to_vec();
        raw.extend_from_slice(b"hostname\0A Minecraft Server\0numplayers\x002\0\0\x01player_\0\0Notch\0jeb_\0\0");

        let status = parse_full_stat_response(&raw).unwrap();
        assert_eq!(status.server.host.name, "A Minecraft Server");
        assert_eq!(status.server.player_info.online, 2);
        assert_eq!(status.players, ["Notch", "jeb_"]);
    }
}
