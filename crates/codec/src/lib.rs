//! # Attachlink Codec
//!
//! Wire codec for attachment-service query arguments.
//!
//! The attachment backends accept a Base64 payload whose inner bytes follow a
//! legacy UTF-8 scheme that operates per UTF-16 code unit: 1 byte below
//! U+0080, 2 bytes below U+0800, 3 bytes otherwise. Characters outside the
//! Basic Multilingual Plane are therefore emitted as two 3-byte surrogate
//! sequences (CESU-8 style) rather than a single 4-byte sequence. That is the
//! format the services have always accepted, so this crate reproduces it
//! exactly instead of fixing it.
//!
//! Decoding is best-effort: malformed input never fails, it degrades.

use base64::alphabet;
use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, Engine, GeneralPurpose, GeneralPurposeConfig};
use percent_encoding::percent_decode_str;

/// Standard alphabet, tolerant decode: padding optional, trailing bits ignored.
const PERMISSIVE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Encode `plain` into the wire form expected by the attachment services:
/// legacy UTF-8 bytes (see crate docs) wrapped in standard padded Base64.
pub fn encode(plain: &str) -> String {
    STANDARD.encode(legacy_utf8_bytes(plain))
}

/// Reverse [`encode`], best-effort.
///
/// Bytes outside the Base64 alphabet are dropped, an impossible trailing
/// quantum is discarded, and invalid inner sequences decode lossily. Never
/// fails; garbage in, shorter garbage out.
pub fn decode(wire: &str) -> String {
    let cleaned: String = wire
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/'))
        .collect();

    // A single leftover symbol cannot carry a whole byte.
    let keep = if cleaned.len() % 4 == 1 {
        cleaned.len() - 1
    } else {
        cleaned.len()
    };

    let bytes = PERMISSIVE.decode(&cleaned[..keep]).unwrap_or_default();
    String::from_utf16_lossy(&legacy_utf16_units(&bytes))
}

/// Reverse URL-style query encoding: `+` as space, then percent sequences.
/// Invalid percent escapes pass through unchanged.
pub fn decode_query_value(value: &str) -> String {
    let spaced = value.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

fn legacy_utf8_bytes(plain: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(plain.len());
    for unit in plain.encode_utf16() {
        if unit < 0x80 {
            bytes.push(unit as u8);
        } else if unit < 0x800 {
            bytes.push(0xc0 | (unit >> 6) as u8);
            bytes.push(0x80 | (unit & 0x3f) as u8);
        } else {
            bytes.push(0xe0 | (unit >> 12) as u8);
            bytes.push(0x80 | ((unit >> 6) & 0x3f) as u8);
            bytes.push(0x80 | (unit & 0x3f) as u8);
        }
    }
    bytes
}

fn legacy_utf16_units(bytes: &[u8]) -> Vec<u16> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b < 0x80 {
            units.push(u16::from(b));
            i += 1;
        } else if (0xc0..0xe0).contains(&b) {
            let Some(&b2) = bytes.get(i + 1) else {
                break; // truncated tail, drop it
            };
            units.push((u16::from(b & 0x1f) << 6) | u16::from(b2 & 0x3f));
            i += 2;
        } else {
            let (Some(&b2), Some(&b3)) = (bytes.get(i + 1), bytes.get(i + 2)) else {
                break;
            };
            units.push(
                (u16::from(b & 0x0f) << 12) | (u16::from(b2 & 0x3f) << 6) | u16::from(b3 & 0x3f),
            );
            i += 3;
        }
    }
    units
}
