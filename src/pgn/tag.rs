use std::{
    borrow::Cow,
    fmt,
    str::{self, Utf8Error},
};

use tracing::{trace, warn};

use crate::tree::Headers;

/// A tag value, as found between the quotes of a header line like
/// `[Title "Queen's Gambit"]`.
///
/// Provides helper methods for decoding [backslash
/// escaped](http://www.saremba.de/chessgml/standards/pgn/pgn-complete.htm#c7)
/// values.
///
/// > A quote inside a string is represented by the backslash immediately
/// > followed by a quote. A backslash inside a string is represented by
/// > two adjacent backslashes.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct RawTag<'a>(pub &'a [u8]);

impl<'a> RawTag<'a> {
    /// Returns the raw byte representation of the tag value.
    pub fn as_bytes(&self) -> &[u8] {
        self.0
    }

    /// Decodes escaped quotes and backslashes into bytes. Allocates only when
    /// the value actually contains escape sequences.
    pub fn decode(&self) -> Cow<'a, [u8]> {
        let mut head = 0;
        let mut decoded: Vec<u8> = Vec::new();
        for escape in memchr::memchr_iter(b'\\', self.0) {
            if escape < head {
                continue;
            }
            match self.0.get(escape + 1) {
                Some(b'\\' | b'"') => {
                    decoded.extend_from_slice(&self.0[head..escape]);
                    head = escape + 1;
                }
                _ => (),
            }
        }
        if head == 0 {
            Cow::Borrowed(self.0)
        } else {
            decoded.extend_from_slice(&self.0[head..]);
            Cow::Owned(decoded)
        }
    }

    /// Tries to decode the tag as UTF-8.
    ///
    /// # Errors
    ///
    /// Errors if the tag contains an invalid UTF-8 byte sequence.
    pub fn decode_utf8(&self) -> Result<Cow<'a, str>, Utf8Error> {
        Ok(match self.decode() {
            Cow::Borrowed(borrowed) => Cow::Borrowed(str::from_utf8(borrowed)?),
            Cow::Owned(owned) => Cow::Owned(String::from_utf8(owned).map_err(|e| e.utf8_error())?),
        })
    }

    /// Decodes the tag as UTF-8, replacing any invalid byte sequences with
    /// the placeholder � U+FFFD.
    pub fn decode_utf8_lossy(&self) -> Cow<'a, str> {
        match self.decode() {
            Cow::Borrowed(borrowed) => String::from_utf8_lossy(borrowed),
            Cow::Owned(owned) => Cow::Owned(String::from_utf8_lossy(&owned).into_owned()),
        }
    }
}

impl fmt::Debug for RawTag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.decode_utf8_lossy())
    }
}

/// Escapes quotes and backslashes, the inverse of [`RawTag::decode()`].
pub fn encode(value: &str) -> Cow<'_, str> {
    if !value.contains(['\\', '"']) {
        return Cow::Borrowed(value);
    }
    let mut encoded = String::with_capacity(value.len() + 2);
    for ch in value.chars() {
        if ch == '\\' || ch == '"' {
            encoded.push('\\');
        }
        encoded.push(ch);
    }
    Cow::Owned(encoded)
}

/// Reads the header lines at the start of `pgn` into `headers` and returns
/// the movetext that follows.
pub(crate) fn read_headers<'a>(pgn: &'a str, headers: &mut Headers) -> &'a str {
    let bytes = pgn.as_bytes();
    let mut pos = if bytes.starts_with(b"\xef\xbb\xbf") { 3 } else { 0 };

    loop {
        while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
            pos += 1;
        }
        if bytes.get(pos) != Some(&b'[') {
            break;
        }

        // Several tags may share a line, so a tag ends at its closing
        // bracket. A tag without one runs to the end of the line.
        let line_start = pos + 1;
        let line_end = memchr::memchr(b'\n', &bytes[pos..]).map_or(bytes.len(), |i| pos + i);
        let line = &bytes[line_start..line_end];
        pos = line_end;

        let Some(left_quote) = memchr::memchr(b'"', line) else {
            warn!(line = %String::from_utf8_lossy(line), "header without value");
            continue;
        };

        let value_start = left_quote + 1;
        let mut right_quote = value_start;
        let value_end = loop {
            match memchr::memchr2(b'\\', b'"', &line[right_quote..]) {
                Some(delta) if line[right_quote + delta] == b'"' => {
                    let value_end = right_quote + delta;
                    if let Some(bracket) = memchr::memchr(b']', &line[value_end..]) {
                        pos = line_start + value_end + bracket + 1;
                    }
                    break value_end;
                }
                Some(delta) => {
                    // Skip escaped character.
                    right_quote = (right_quote + delta + 2).min(line.len());
                }
                None => {
                    warn!(line = %String::from_utf8_lossy(line), "unterminated header value");
                    let rest = &line[value_start..];
                    break value_start + rest.trim_ascii_end().strip_suffix(b"]").map_or(rest.len(), <[u8]>::len);
                }
            }
        };

        let name = String::from_utf8_lossy(line[..left_quote].trim_ascii()).into_owned();
        let value = RawTag(&line[value_start..value_end]).decode_utf8_lossy().into_owned();
        trace!(%name, %value, "header");
        headers.set(name, value);
    }

    &pgn[pos..]
}
