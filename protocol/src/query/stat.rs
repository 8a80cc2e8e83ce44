//! Walks the payload of a full-stat response.
//!
//! The payload is a NUL-delimited run of key/value pairs closed by an empty
//! key, followed by a player section introduced by the `player_` sentinel:
//!
//! ```text
//! hostname\0A Minecraft Server\0gametype\0SMP\0...\0hostip\0127.0.0.1\0\0
//! \x01player_\0\0Notch\0jeb_\0\0
//! ```
//!
//! The plugin list hides inside the `plugins` value as
//! `<mod name>: <plugin> <version>; <plugin> <version>`.

use std::{ops::RangeInclusive, str::FromStr};

use log::debug;

use crate::tokens::{self, find_sentinel, find_sentinel_from, rfind_sentinel, Field};

use super::status::{Plugin, QueryStatus};

pub const PLAYER_SENTINEL: &[u8] = b"player_";
pub const MAP_SENTINEL: &[u8] = b"\0map\0";
pub const MOD_NAME_SEPARATOR: &[u8] = b": ";
pub const PLUGIN_DELIMITER: u8 = b';';

/// Bytes that may separate a plugin name from its version.
pub const PLUGIN_VERSION_SEPARATORS: RangeInclusive<u8> = 0x1e..=0x27;

/// Builds a [`QueryStatus`] from a header-stripped full-stat payload.
///
/// The `player_` sentinel ends the key/value walk wherever it shows up, in key
/// or value position. If the walk ends at the `\0\0` section terminator
/// instead, the rest of the buffer is searched for it.
pub fn parse_stat_payload(buf: &[u8]) -> QueryStatus {
    let mut status = QueryStatus::default();
    let mut fields = tokens::fields(buf, 0);
    let mut players_from = None;
    let mut section_end = buf.len();

    while let Some(key) = fields.next() {
        if key.bytes.is_empty() {
            section_end = key.offset;
            break;
        }

        if let Some(start) = player_section(key) {
            players_from = Some(start);
            break;
        }

        let Some(value) = fields.next() else {
            debug!("discarding trailing key '{}'", key.text());
            break;
        };

        if let Some(start) = player_section(value) {
            debug!("player section in place of the value of '{}'", key.text());
            players_from = Some(start);
            break;
        }

        apply(&mut status, buf, key, value);
    }

    let players_from = players_from.or_else(|| {
        find_sentinel_from(buf, PLAYER_SENTINEL, section_end)
            .map(|index| index + PLAYER_SENTINEL.len())
    });

    if let Some(players) = players_from.and_then(|start| buf.get(start..)) {
        status.players = parse_players(players);
    }

    status
}

/// Offset of the first byte after the `player_` sentinel, if `field` holds it.
fn player_section(field: Field) -> Option<usize> {
    find_sentinel(field.bytes, PLAYER_SENTINEL)
        .map(|index| field.offset + index + PLAYER_SENTINEL.len())
}

fn apply(status: &mut QueryStatus, buf: &[u8], key: Field, value: Field) {
    let text = value.text();
    match &*key.text() {
        "hostname" => status.server.host.name = text.into_owned(),
        "hostport" => status.server.host.port = number("hostport", &text),
        "hostip" => status.server.host.ip = text.into_owned(),
        "version" => status.server.version.name = text.into_owned(),
        "numplayers" => status.server.player_info.online = number("numplayers", &text),
        "maxplayers" => status.server.player_info.max = number("maxplayers", &text),
        "gametype" => status.game.kind = text.into_owned(),
        "game_id" => status.game.name = text.into_owned(),
        "map" => status.game.map = text.into_owned(),
        "plugins" => status.plugins = parse_plugins(plugin_range(buf, value)),
        other => debug!("ignoring unknown key '{other}'"),
    }
}

fn number<T: FromStr + Default>(key: &str, value: &str) -> T {
    match value.trim_matches(|c: char| !c.is_ascii_digit()).parse() {
        Ok(number) => number,
        Err(_) => {
            debug!("'{key}' has non-numeric value '{value}'");
            T::default()
        }
    }
}

/// Raw bytes from the start of the `plugins` value up to the `map` key.
fn plugin_range<'a>(buf: &'a [u8], value: Field<'a>) -> &'a [u8] {
    let end = find_sentinel_from(buf, MAP_SENTINEL, value.offset).unwrap_or(value.end());
    buf.get(value.offset..end).unwrap_or(value.bytes)
}

/// Splits `<mod name>: A 1.0; B 2.0` into plugins. Without a mod-name header
/// there is no plugin list.
pub fn parse_plugins(range: &[u8]) -> Vec<Plugin> {
    let Some(header_end) = rfind_sentinel(range, MOD_NAME_SEPARATOR) else {
        return Vec::new();
    };

    range[header_end + MOD_NAME_SEPARATOR.len()..]
        .split(|&byte| byte == PLUGIN_DELIMITER)
        .map(trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            match segment
                .iter()
                .position(|byte| PLUGIN_VERSION_SEPARATORS.contains(byte))
            {
                Some(index) => Plugin::new(
                    lossy(trim(&segment[..index])),
                    lossy(trim(&segment[index + 1..])),
                ),
                None => Plugin::new(lossy(segment), ""),
            }
        })
        .collect()
}

/// Player names never contain spaces, servers separate them with NULs or spaces.
pub fn parse_players(section: &[u8]) -> Vec<String> {
    tokens::tokens(section, |byte| byte == 0 || byte == b' ')
        .into_iter()
        .map(|name| name.into_owned())
        .collect()
}

fn trim(mut bytes: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = bytes {
        if !is_padding(*first) {
            break;
        }
        bytes = rest;
    }
    while let [rest @ .., last] = bytes {
        if !is_padding(*last) {
            break;
        }
        bytes = rest;
    }
    bytes
}

fn is_padding(byte: u8) -> bool {
    byte == 0 || byte.is_ascii_whitespace()
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
