// Copyright 2024-2026 The mqjms Authors
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Codec between application correlation strings and the fixed-size byte
//! field the native descriptor carries.
//!
//! Two shapes of input are supported on encode:
//!
//! * a lowercase hex digit string, which is taken as the literal bytes it
//!   spells (the shape an application gets when it copies a received
//!   message identifier), and
//! * any other text, which is hex-encoded so it survives the provider's
//!   byte-oriented field and recovered verbatim on decode.
//!
//! Correlation text longer than [`CORREL_ID_TEXT_MAX`] bytes is truncated to
//! the native field width. That truncation is lossy and deliberate; the
//! provider has no room for more.

/// Longest plain-text correlation id that survives a full round trip.
pub const CORREL_ID_TEXT_MAX: usize = 24;

/// Width of the native correlation field in bytes.
pub const CORREL_ID_FIELD_WIDTH: usize = 48;

/// Encodes an application correlation string into its native byte form.
///
/// An empty string encodes to an all-zero [`CORREL_ID_TEXT_MAX`]-byte
/// buffer, the provider's "no correlation id" value.
pub fn encode(text: &str) -> Vec<u8> {
    if text.is_empty() {
        return vec![0; CORREL_ID_TEXT_MAX];
    }

    let mut buf = if let Some(raw) = decode_hex_digits(text) {
        raw
    } else {
        let mut encoded = hex::encode(text.as_bytes()).into_bytes();
        // Pad with encoded zero nibbles, not raw zero bytes, so the padding
        // itself hex-decodes to NULs that the decode path trims away.
        while encoded.len() < CORREL_ID_TEXT_MAX {
            encoded.push(b'0');
        }
        encoded
    };

    if buf.len() > CORREL_ID_FIELD_WIDTH {
        log::debug!(
            "correlation id of {} bytes truncated to native field width {}",
            buf.len(),
            CORREL_ID_FIELD_WIDTH
        );
        buf.truncate(CORREL_ID_FIELD_WIDTH);
    }

    buf
}

/// Decodes a native correlation field back into the string the application
/// most likely supplied.
///
/// Trailing NUL padding is stripped first. If what remains spells a hex
/// string it is decoded back to text; otherwise the bytes themselves are
/// rendered as hex so nothing is silently dropped. An all-zero field decodes
/// to the empty string.
pub fn decode(bytes: &[u8]) -> String {
    let trimmed = trim_trailing_nuls(bytes);
    if trimmed.is_empty() {
        return String::new();
    }

    if let Ok(text) = std::str::from_utf8(trimmed) {
        if let Some(raw) = decode_hex_digits(text) {
            let raw = trim_trailing_nuls(&raw);
            if !raw.is_empty() {
                if let Ok(recovered) = std::str::from_utf8(raw) {
                    return recovered.to_string();
                }
            }
        }
    }

    hex::encode(trimmed)
}

/// Decodes `text` as a lowercase hex digit string, or returns `None` when it
/// is not one. Uppercase digits are rejected on purpose: `decode` always
/// renders hex in lowercase, and accepting both cases here would break the
/// decode-of-encode identity for uppercase input.
fn decode_hex_digits(text: &str) -> Option<Vec<u8>> {
    if text.is_empty() || text.len() % 2 != 0 {
        return None;
    }
    if !text
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return None;
    }
    hex::decode(text).ok()
}

fn trim_trailing_nuls(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |pos| pos + 1);
    &bytes[..end]
}
