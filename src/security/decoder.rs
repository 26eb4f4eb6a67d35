//! Decoded variants of inspected input.
//!
//! Inspection runs against the raw text and a single percent-decoding pass of
//! it (with `+` read as a space, as form decoding does). Decoding is never
//! repeated, so double-encoded payloads such as `%253C` reach the matcher as
//! `%3C`.

use std::borrow::Cow;

/// Returns the raw input plus its decoded form when that differs.
///
/// At most two variants are produced. Byte sequences that do not decode to
/// valid UTF-8 are replaced rather than dropped.
pub fn variants(input: &str) -> Vec<Cow<'_, str>> {
    let mut out = vec![Cow::Borrowed(input)];

    if !input.contains('%') && !input.contains('+') {
        return out;
    }

    let plus_as_space = input.replace('+', " ");
    let decoded = urlencoding::decode_binary(plus_as_space.as_bytes());
    let decoded = String::from_utf8_lossy(&decoded).into_owned();

    if decoded != input {
        out.push(Cow::Owned(decoded));
    }

    out
}
