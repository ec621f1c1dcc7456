//! STOMP header escaping.
//!
//! Header names and values travel on a line-oriented wire format, so the
//! four octets that would break a header line are escaped:
//! - backslash (0x5c) → `\\`
//! - carriage return (0x0d) → `\r`
//! - line feed (0x0a) → `\n`
//! - colon (0x3a) → `\c`
//!
//! Both directions scan the input one code point at a time. Well-formed
//! multi-byte UTF-8 sequences are copied untouched; bytes that do not start a
//! valid sequence are handled as single literal bytes, never as errors.

/// Width in bytes of the UTF-8 code point starting at `bytes[0]`.
///
/// Returns 1 for `\t`, `\n`, `\r` and printable ASCII, 2 to 4 for well-formed
/// multi-byte sequences (overlong encodings and surrogates excluded), and 0
/// when the bytes do not validate (other control bytes, stray continuation
/// bytes, truncated sequences).
pub fn utf8_sequence_len(bytes: &[u8]) -> usize {
    let Some(&b0) = bytes.first() else {
        return 0;
    };
    if b0 == 0x09 || b0 == 0x0A || b0 == 0x0D || (0x20..=0x7E).contains(&b0) {
        return 1;
    }

    let cont = |i: usize| matches!(bytes.get(i), Some(0x80..=0xBF));

    if bytes.len() < 2 {
        return 0;
    }
    if (0xC2..=0xDF).contains(&b0) && cont(1) {
        return 2;
    }

    if bytes.len() < 3 {
        return 0;
    }
    let b1 = bytes[1];
    let three = match b0 {
        0xE0 => (0xA0..=0xBF).contains(&b1),
        0xE1..=0xEC | 0xEE | 0xEF => cont(1),
        0xED => (0x80..=0x9F).contains(&b1),
        _ => false,
    };
    if three && cont(2) {
        return 3;
    }

    if bytes.len() < 4 {
        return 0;
    }
    let four = match b0 {
        0xF0 => (0x90..=0xBF).contains(&b1),
        0xF1..=0xF3 => cont(1),
        0xF4 => (0x80..=0x8F).contains(&b1),
        _ => false,
    };
    if four && cont(2) && cont(3) {
        return 4;
    }

    0
}

/// Escape a header name or value for transmission.
pub fn escape_header(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + 16);
    let mut i = 0usize;
    while i < input.len() {
        let width = utf8_sequence_len(&input[i..]);
        if width > 1 {
            out.extend_from_slice(&input[i..i + width]);
            i += width;
            continue;
        }
        match input[i] {
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b':' => out.extend_from_slice(b"\\c"),
            b'\\' => out.extend_from_slice(b"\\\\"),
            b => out.push(b),
        }
        i += 1;
    }
    out
}

/// Reverse [`escape_header`].
///
/// A backslash that is not followed by `r`, `n`, `c` or another backslash is
/// kept as a literal backslash; the following byte is then processed normally.
pub fn unescape_header(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0usize;
    while i < input.len() {
        let width = utf8_sequence_len(&input[i..]);
        if width > 1 {
            out.extend_from_slice(&input[i..i + width]);
            i += width;
            continue;
        }
        if input[i] == b'\\' {
            let expanded = match input.get(i + 1) {
                Some(b'r') => Some(b'\r'),
                Some(b'n') => Some(b'\n'),
                Some(b'c') => Some(b':'),
                Some(b'\\') => Some(b'\\'),
                _ => None,
            };
            if let Some(b) = expanded {
                out.push(b);
                i += 2;
                continue;
            }
        }
        out.push(input[i]);
        i += 1;
    }
    out
}
