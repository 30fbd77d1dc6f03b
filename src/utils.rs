//! Utility functions.

use crate::error::{ConvertError, Result};

/// True if `token` is a non-empty string of ASCII hex digits.
pub fn is_hex_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Parses a bare hexadecimal integer (no `0x` prefix).
pub fn parse_hex_u64(token: &str) -> Option<u64> {
    if !is_hex_token(token) {
        return None;
    }
    u64::from_str_radix(token, 16).ok()
}

/// Decodes pairs of hex digits in `token` and appends the bytes to `out`.
///
/// The first digit of each pair is the high nibble.
pub fn decode_hex_token(token: &str, out: &mut Vec<u8>) -> Result<()> {
    let bytes = hex::decode(token).map_err(|_| ConvertError::HexFormat {
        token: token.to_string(),
    })?;
    out.extend_from_slice(&bytes);
    Ok(())
}
