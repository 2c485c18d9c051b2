//! # Error Types
//!
//! Parsing and construction errors for the foundational types. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Errors raised while constructing core primitives from external input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A hex string contained a non-hex character or had odd length.
    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),

    /// Decoded bytes did not have the length the identifier requires.
    #[error("invalid length for {kind}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// The identifier kind being decoded (e.g., "round id").
        kind: &'static str,
        /// Required byte length.
        expected: usize,
        /// Length actually decoded.
        actual: usize,
    },

    /// An epoch value could not be represented as a calendar date.
    #[error("timestamp out of range: {0}")]
    TimestampOutOfRange(u64),

    /// A decimal amount string failed to parse.
    #[error("invalid amount: \"{0}\"")]
    InvalidAmount(String),
}
