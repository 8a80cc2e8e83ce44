//! Tokenizing and sentinel search over unframed response buffers.
//!
//! Every lookup goes through slice `windows`/`get`, so a sentinel that would
//! run past the end of a buffer is reported as absent instead of faulting.

use std::borrow::Cow;

/// Splits `buf` into maximal runs of bytes for which `is_delimiter` is false.
/// Runs of delimiters only separate tokens, they never produce empty ones.
pub fn tokens(buf: &[u8], is_delimiter: impl Fn(u8) -> bool) -> Vec<Cow<'_, str>> {
    buf.split(|&byte| is_delimiter(byte))
        .filter(|token| !token.is_empty())
        .map(String::from_utf8_lossy)
        .collect()
}

/// [`tokens`] with a single terminator byte.
pub fn split_tokens(buf: &[u8], terminator: u8) -> Vec<Cow<'_, str>> {
    tokens(buf, |byte| byte == terminator)
}

/// A terminator-delimited field and its offset into the buffer it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    pub offset: usize,
    pub bytes: &'a [u8],
}

impl<'a> Field<'a> {
    pub fn text(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.bytes)
    }

    /// Offset of the first byte after this field.
    pub fn end(&self) -> usize {
        self.offset + self.bytes.len()
    }
}

/// Positional split on `terminator`. Unlike [`tokens`], empty fields are kept so
/// that key/value pairs stay aligned when a value is empty.
pub fn fields(buf: &[u8], terminator: u8) -> impl Iterator<Item = Field<'_>> {
    let mut offset = 0;
    buf.split(move |&byte| byte == terminator).map(move |bytes| {
        let field = Field { offset, bytes };
        offset += bytes.len() + 1;
        field
    })
}

/// Index of the first occurrence of `sentinel` in `buf`.
pub fn find_sentinel(buf: &[u8], sentinel: &[u8]) -> Option<usize> {
    if sentinel.is_empty() {
        return None;
    }
    buf.windows(sentinel.len())
        .position(|window| window == sentinel)
}

/// Index of the first occurrence of `sentinel` at or after `start`.
pub fn find_sentinel_from(buf: &[u8], sentinel: &[u8], start: usize) -> Option<usize> {
    find_sentinel(buf.get(start..)?, sentinel).map(|index| index + start)
}

/// Index of the last occurrence of `sentinel` in `buf`.
pub fn rfind_sentinel(buf: &[u8], sentinel: &[u8]) -> Option<usize> {
    if sentinel.is_empty() {
        return None;
    }
    buf.windows(sentinel.len())
        .rposition(|window| window == sentinel)
}

/// The bytes strictly between the first `start` sentinel and the next `end`
/// sentinel after it.
pub fn between<'a>(buf: &'a [u8], start: &[u8], end: &[u8]) -> Option<&'a [u8]> {
    let from = find_sentinel(buf, start)? + start.len();
    let to = find_sentinel_from(buf, end, from)?;
    buf.get(from..to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_terminators_produce_no_empty_tokens() {
        let buf = b"\0\0hostname\0MyServer\0\0\0map\0";
        assert_eq!(split_tokens(buf, 0), ["hostname", "MyServer", "map"]);
    }

    #[test]
    fn tokens_with_several_delimiters() {
        let buf = b"Alice Bob\0\0Carol  ";
        assert_eq!(
            tokens(buf, |byte| byte == 0 || byte == b' '),
            ["Alice", "Bob", "Carol"]
        );
    }

    #[test]
    fn fields_keep_empty_values_and_offsets() {
        let buf = b"plugins\0\0map\0world";
        let fields: Vec<_> = fields(buf, 0).collect();

        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].bytes, b"plugins");
        assert_eq!(fields[1], Field { offset: 8, bytes: b"" });
        assert_eq!(fields[2].offset, 9);
        assert_eq!(fields[3].text(), "world");
        assert_eq!(fields[3].end(), buf.len());
    }

    #[test]
    fn finds_sentinels() {
        let buf = b"splitnum\0\x80\0hostname\0x\0player_\0";
        assert_eq!(find_sentinel(buf, b"hostname"), Some(11));
        assert_eq!(find_sentinel(buf, b"player_"), Some(22));
        assert_eq!(find_sentinel_from(buf, b"player_", 22), Some(22));
        assert_eq!(find_sentinel_from(buf, b"player_", 23), None);
        assert_eq!(find_sentinel(buf, b"missing"), None);
    }

    #[test]
    fn partial_match_at_tail_is_not_found() {
        assert_eq!(find_sentinel(b"abcplay", b"player_"), None);
        assert_eq!(find_sentinel(b"pl", b"player_"), None);
        assert_eq!(find_sentinel(b"", b"player_"), None);
        assert_eq!(rfind_sentinel(b"x:", b": "), None);
        assert_eq!(find_sentinel_from(b"abc", b"c", 10), None);
        assert_eq!(find_sentinel(b"abc", b""), None);
    }

    #[test]
    fn rfind_picks_last_occurrence() {
        assert_eq!(rfind_sentinel(b"a: b: c", b": "), Some(4));
    }

    #[test]
    fn between_two_sentinels() {
        let buf = b"plugins\0Foo 1.0\0map\0world";
        assert_eq!(between(buf, b"plugins\0", b"\0map\0"), Some(&b"Foo 1.0"[..]));
        assert_eq!(between(buf, b"plugins\0", b"missing"), None);
        assert_eq!(between(buf, b"missing", b"map"), None);
    }

    #[test]
    fn every_prefix_is_safe_to_search() {
        let buf = b"plugins\0x: A 1; B 2\0map\0w\0\0\x01player_\0\0Alice\0";
        for end in 0..=buf.len() {
            let prefix = &buf[..end];
            let _ = find_sentinel(prefix, b"player_");
            let _ = rfind_sentinel(prefix, b": ");
            let _ = between(prefix, b"plugins\0", b"\0map\0");
            let _ = split_tokens(prefix, 0);
            assert_eq!(fields(prefix, 0).last().map(|f| f.end()), Some(end));
        }
    }
}
