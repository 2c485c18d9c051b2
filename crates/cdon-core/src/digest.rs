//! # Digest and Hex Helpers
//!
//! SHA-256 is the only hash in the workspace. Round ids derived from labels,
//! principal test fixtures and the mock backend's handle allocation all use
//! the functions in this module.

use sha2::{Digest, Sha256};

use crate::error::CoreError;

/// Compute the SHA-256 digest of a byte string.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    bytes
}

/// Compute SHA-256 over the concatenation of several byte strings.
///
/// Each part is length-prefixed (u64 big-endian) so that `["ab", "c"]` and
/// `["a", "bc"]` hash differently.
pub fn sha256_concat(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part);
    }
    let hash = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    bytes
}

/// Render bytes as a lowercase hex string (no prefix).
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a hex string, accepting an optional `0x` prefix.
pub fn from_hex(s: &str) -> Result<Vec<u8>, CoreError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.len() % 2 != 0 {
        return Err(CoreError::InvalidHex(s.to_string()));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            digits
                .get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| CoreError::InvalidHex(s.to_string()))
        })
        .collect()
}
