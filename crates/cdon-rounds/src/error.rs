//! # Round Error Types
//!
//! Structured error hierarchy for round operations. Every mutating
//! operation is all-or-nothing: when one of these errors is returned, no
//! round field changed and no event was appended.
//!
//! Display strings carry the same short reasons a front end matches on
//! (`"not started"`, `"ended"`, `"round not found"`, `"not round owner"`,
//! `"not ended"`, `"policy: ..."`), so callers can present precise feedback
//! without this crate depending on any presentation layer.

use thiserror::Error;

use cdon_core::{Amount, RoundId};
use cdon_fhe::FheError;

/// Which side of the donation window a rejected donation fell on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowClosed {
    /// `now < start_at`.
    NotStarted,
    /// `now > end_at`.
    Ended,
}

impl std::fmt::Display for WindowClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => f.write_str("not started"),
            Self::Ended => f.write_str("ended"),
        }
    }
}

/// Errors arising from round registry operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoundError {
    /// No round is registered under this id.
    #[error("round not found: {0}")]
    RoundNotFound(RoundId),

    /// A round is already registered under this id; ids are never reused.
    #[error("round already exists: {0}")]
    RoundAlreadyExists(RoundId),

    /// `start_at` must be strictly before `end_at`.
    #[error("invalid time window: start {start_at} must be before end {end_at}")]
    InvalidTimeWindow {
        /// Requested start (epoch seconds).
        start_at: u64,
        /// Requested end (epoch seconds).
        end_at: u64,
    },

    /// The beneficiary is the null principal.
    #[error("zero beneficiary")]
    ZeroBeneficiary,

    /// Title or description exceeds the configured limit.
    #[error("{field} too long: {actual} bytes exceeds limit of {max}")]
    InvalidMetadata {
        /// Which field ("title" or "description").
        field: &'static str,
        /// Configured maximum length in bytes.
        max: usize,
        /// Actual length in bytes.
        actual: usize,
    },

    /// Donation outside `[start_at, end_at]`.
    #[error("donation window closed: {0}")]
    DonationWindowClosed(WindowClosed),

    /// The encryption backend rejected the input proof.
    #[error("invalid input proof")]
    ProofInvalid,

    /// Only the round owner may perform this action.
    #[error("not round owner")]
    NotRoundOwner,

    /// The round's disclosure policy is not satisfied yet (or ever).
    #[error("{reason}")]
    PolicyNotSatisfied {
        /// Which policy clause failed (e.g., `"policy: after end"`).
        reason: String,
    },

    /// Payout already ran for this round.
    #[error("already paid out")]
    AlreadyPaidOut,

    /// Payout requires `now > end_at`.
    #[error("not ended")]
    RoundNotEnded,

    /// Crediting the payment would overflow the escrow balance.
    #[error("escrow overflow: balance {balance} + payment {payment}")]
    EscrowOverflow {
        /// Balance before the payment.
        balance: Amount,
        /// The attached payment.
        payment: Amount,
    },

    /// A homomorphic operation failed in the backend.
    #[error("encryption backend: {0}")]
    Backend(#[from] FheError),

    /// The host refused the payout transfer; the payout was reverted.
    #[error("transfer failed: {0}")]
    TransferFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_closed_display_matches_reasons() {
        let err = RoundError::DonationWindowClosed(WindowClosed::NotStarted);
        assert!(err.to_string().contains("not started"));
        let err = RoundError::DonationWindowClosed(WindowClosed::Ended);
        assert!(err.to_string().ends_with("ended"));
    }

    #[test]
    fn policy_reason_is_the_message() {
        let err = RoundError::PolicyNotSatisfied {
            reason: "policy: never".to_string(),
        };
        assert_eq!(err.to_string(), "policy: never");
    }

    #[test]
    fn round_not_found_display() {
        let id = RoundId::from_label("missing");
        let msg = RoundError::RoundNotFound(id).to_string();
        assert!(msg.contains("round not found"));
        assert!(msg.contains(&id.to_hex()));
    }

    #[test]
    fn owner_and_time_reasons() {
        assert_eq!(RoundError::NotRoundOwner.to_string(), "not round owner");
        assert_eq!(RoundError::RoundNotEnded.to_string(), "not ended");
    }

    #[test]
    fn invalid_metadata_display() {
        let err = RoundError::InvalidMetadata {
            field: "title",
            max: 8,
            actual: 9,
        };
        let msg = err.to_string();
        assert!(msg.contains("title"));
        assert!(msg.contains('8'));
        assert!(msg.contains('9'));
    }

    #[test]
    fn backend_error_converts() {
        let err: RoundError = FheError::Backend("boom".to_string()).into();
        assert!(matches!(err, RoundError::Backend(_)));
    }
}
