//! Key mangling for search tokens.
//!
//! A search key is built from a display label in two steps: the label is
//! lowercased and every byte outside `[a-z0-9]` is escaped as `_` followed by
//! two lowercase hex digits (so `_` becomes `_5f`, `~` becomes `_7e`,
//! `<` becomes `_3c`; non-ASCII characters escape each UTF-8 byte). The
//! resulting *stem* is then suffixed with `_<n>`, the record's zero-based
//! position in its array, which makes keys unique even when two symbols share
//! a name.

use thiserror::Error;

/// Error produced when a mangled stem cannot be decoded back to text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// An `_` escape was not followed by two hex digits.
    #[error("truncated escape sequence at byte {0}")]
    TruncatedEscape(usize),
    /// An `_` escape contained a non-hex digit.
    #[error("invalid hex digits in escape at byte {0}")]
    InvalidHex(usize),
    /// A character that is neither `[a-z0-9]` nor part of an escape.
    #[error("unexpected character {0:?} at byte {1}")]
    UnexpectedChar(char, usize),
    /// The escaped byte sequence is not valid UTF-8.
    #[error("escape sequence does not decode to valid UTF-8")]
    InvalidUtf8,
}

/// Mangles a display label into a key stem.
///
/// The output contains only `[a-z0-9]` and `_xx` escapes, so it is safe to
/// use both as a search token and as part of a shard file name.
pub fn encode_stem(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for ch in label.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).bytes() {
                out.push('_');
                push_hex(&mut out, byte);
            }
        }
    }
    out
}

/// Decodes a key stem back to text.
///
/// Case information is lost during encoding, so the result is the lowercased
/// form of the original label.
pub fn decode_stem(stem: &str) -> Result<String, DecodeError> {
    let mut bytes = Vec::with_capacity(stem.len());
    let mut chars = stem.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '_' => {
                let hi = chars.next().ok_or(DecodeError::TruncatedEscape(pos))?.1;
                let lo = chars.next().ok_or(DecodeError::TruncatedEscape(pos))?.1;
                let hi = hi.to_digit(16).ok_or(DecodeError::InvalidHex(pos))?;
                let lo = lo.to_digit(16).ok_or(DecodeError::InvalidHex(pos))?;
                bytes.push((hi * 16 + lo) as u8);
            }
            'a'..='z' | '0'..='9' => bytes.push(ch as u8),
            other => return Err(DecodeError::UnexpectedChar(other, pos)),
        }
    }

    String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)
}

/// Builds a complete key: mangled stem plus ordinal suffix.
pub fn encode_key(label: &str, ordinal: usize) -> String {
    format!("{}_{}", encode_stem(label), ordinal)
}

/// Splits a key into its stem and ordinal suffix.
///
/// Returns `None` when the key carries no `_<digits>` suffix. The split is
/// unambiguous: a literal underscore in the label always encodes as `_5f`,
/// so a stem can never end with a bare `_<digits>` group of its own.
pub fn split_key(key: &str) -> Option<(&str, usize)> {
    let idx = key.rfind('_')?;
    let suffix = &key[idx + 1..];
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let ordinal = suffix.parse().ok()?;
    Some((&key[..idx], ordinal))
}

/// The character a stem's bucket is keyed by.
///
/// Buckets are keyed by the leading character of the mangled name: the
/// character itself for `[a-z0-9]`, otherwise the character whose byte value
/// the leading `_xx` escape encodes (`_7evar` is keyed by `~`).
pub fn bucket_key(stem: &str) -> Option<char> {
    let first = stem.chars().next()?;
    if first.is_ascii_alphanumeric() {
        Some(first)
    } else {
        // Stem is already escaped, so a non-alphanumeric lead is `_xx`.
        let hex = stem.get(1..3)?;
        u8::from_str_radix(hex, 16).ok().map(char::from)
    }
}

/// File-name token of a bucket: the key itself for `[a-z0-9]`, otherwise its
/// two lowercase hex digits. Shard files are named `<section>_<token>.js`.
pub fn bucket_token(key: char) -> String {
    if key.is_ascii_alphanumeric() {
        key.to_string()
    } else {
        format!("{:02x}", key as u32)
    }
}

/// Inverse of [`bucket_token`].
pub fn token_to_bucket_key(token: &str) -> Option<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphanumeric() => Some(c),
        _ => u32::from_str_radix(token, 16).ok().and_then(char::from_u32),
    }
}

fn push_hex(out: &mut String, byte: u8) {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    out.push(HEX[(byte >> 4) as usize] as char);
    out.push(HEX[(byte & 0x0f) as usize] as char);
}
