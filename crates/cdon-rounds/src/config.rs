//! Registry configuration.

use serde::{Deserialize, Serialize};

/// Protocol identifier encrypted inputs are bound to when none is given.
pub const DEFAULT_PROTOCOL_ID: u64 = 10001;

/// Tunables for a [`RoundRegistry`](crate::RoundRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Identifier of the encryption protocol deployment.
    pub protocol_id: u64,
    /// Maximum title length in bytes.
    pub max_title_len: usize,
    /// Maximum description length in bytes.
    pub max_description_len: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            protocol_id: DEFAULT_PROTOCOL_ID,
            max_title_len: 128,
            max_description_len: 4096,
        }
    }
}
