//! Repair of malformed text before it is written as a JSON string.
//!
//! Attribute text may come from a driver as raw bytes in a declared UTF-8
//! encoding that the stored data does not actually respect. Every maximal
//! invalid sequence is replaced by one space, so the output never carries raw
//! invalid bytes and never fails to parse.

use std::borrow::Cow;

/// Decode `bytes` as UTF-8, replacing each invalid sequence with `' '`.
///
/// Valid input is borrowed unchanged.
pub fn sanitize_bytes(bytes: &[u8]) -> Cow<'_, str> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(bytes.len());
    let mut replaced = 0usize;
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
        if !chunk.invalid().is_empty() {
            out.push(' ');
            replaced += 1;
        }
    }
    tracing::debug!(
        replaced,
        len = bytes.len(),
        "Replaced invalid UTF-8 sequences with spaces"
    );
    Cow::Owned(out)
}
