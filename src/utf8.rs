//! UTF-8 helpers: validation, counting, char/byte translation and chunking
//!
//! Nothing here ever returns an offset inside a multi-byte sequence.

use crate::error::{Result, RopeError};

/// Byte is a UTF-8 continuation byte (`0b10xx_xxxx`)
#[inline]
fn is_continuation(byte: u8) -> bool {
    (byte & 0b1100_0000) == 0b1000_0000
}

/// Validate caller-supplied bytes
pub(crate) fn validate(bytes: &[u8]) -> Result<&str> {
    simdutf8::compat::from_utf8(bytes).map_err(|err| RopeError::InvalidEncoding {
        valid_up_to: err.valid_up_to(),
    })
}

/// Count code points (SIMD)
#[inline]
pub(crate) fn count_chars(text: &str) -> usize {
    bytecount::num_chars(text.as_bytes())
}

/// Byte offset of the `char_idx`th char of `text`, which holds `chars` chars.
///
/// Offsets at or past the end map to `text.len()`. Decodes only as far as needed.
pub(crate) fn char_to_byte(text: &str, chars: usize, char_idx: usize) -> usize {
    if char_idx >= chars {
        return text.len();
    }
    // All single-byte: chars and bytes coincide
    if chars == text.len() {
        return char_idx;
    }
    text.char_indices()
        .nth(char_idx)
        .map_or(text.len(), |(byte, _)| byte)
}

/// Number of chars that start before `byte_idx`, rounding down into the
/// char that contains it.
pub(crate) fn byte_to_char(text: &str, byte_idx: usize) -> usize {
    let end = floor_char_boundary(text.as_bytes(), byte_idx);
    bytecount::num_chars(&text.as_bytes()[..end])
}

/// Back off over continuation bytes until `idx` is a char boundary
pub(crate) fn floor_char_boundary(bytes: &[u8], idx: usize) -> usize {
    if idx >= bytes.len() {
        return bytes.len();
    }
    let mut e = idx;
    while e > 0 && is_continuation(bytes[e]) {
        e -= 1;
    }
    e
}

fn ceil_char_boundary(bytes: &[u8], idx: usize) -> usize {
    let mut e = idx;
    while e < bytes.len() && is_continuation(bytes[e]) {
        e += 1;
    }
    e
}

/// Cut `text` into evenly sized fragments of at most `max_leaf` bytes, each
/// ending on a char boundary. Empty text yields no fragments.
pub(crate) fn chunks(text: &str, max_leaf: usize) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len().div_ceil(max_leaf.max(1)));
    let mut pos = 0;

    while pos < bytes.len() {
        let remaining = bytes.len() - pos;
        let pieces = remaining.div_ceil(max_leaf);
        let target = pos + remaining.div_ceil(pieces);

        let mut end = floor_char_boundary(bytes, target);
        if end <= pos {
            // A single char wider than the target; take it whole
            end = ceil_char_boundary(bytes, target);
        }

        out.push(&text[pos..end]);
        pos = end;
    }

    out
}
