//! # Disclosure Policy Engine
//!
//! Decides whether a round's aggregate total may be made public, given a
//! snapshot of the round and the operation's clock reading.
//!
//! ## Policies
//!
//! | policy | code | eligible iff |
//! |---|---|---|
//! | `AfterEnd` | 0 | `now > end_at` |
//! | `AfterEndAndGoal` | 1 | `now > end_at` and `escrow >= goal` |
//! | `Never` | 2 | never |
//!
//! The goal clause compares the plaintext escrow balance (money actually
//! received), not a decrypted pledge total. The engine never decrypts.

use serde::{Deserialize, Serialize};

use cdon_core::{Amount, Timestamp};

/// When a round's aggregate total becomes publicly decryptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisclosurePolicy {
    /// Public once the round has ended.
    AfterEnd,
    /// Public once the round has ended and escrow reached the goal.
    AfterEndAndGoal,
    /// Never public.
    Never,
}

impl DisclosurePolicy {
    /// Numeric wire code (0, 1, 2).
    pub fn code(&self) -> u8 {
        match self {
            Self::AfterEnd => 0,
            Self::AfterEndAndGoal => 1,
            Self::Never => 2,
        }
    }

    /// Parse a numeric wire code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::AfterEnd),
            1 => Some(Self::AfterEndAndGoal),
            2 => Some(Self::Never),
            _ => None,
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AfterEnd => "after end",
            Self::AfterEndAndGoal => "after end & goal",
            Self::Never => "never",
        }
    }

    /// Evaluate this policy against `input` at `now`.
    pub fn evaluate(&self, input: &PolicyInput, now: Timestamp) -> Result<(), PolicyRejection> {
        let ended = now > input.end_at;
        match self {
            Self::Never => Err(PolicyRejection::new("policy: never", "never")),
            Self::AfterEnd if ended => Ok(()),
            Self::AfterEnd => Err(PolicyRejection::new("policy: after end", "round not ended")),
            Self::AfterEndAndGoal if !ended => Err(PolicyRejection::new(
                "policy: after end & goal",
                "round not ended",
            )),
            Self::AfterEndAndGoal if input.escrow < Amount::from(input.goal) => Err(
                PolicyRejection::new("policy: after end & goal", "goal not reached"),
            ),
            Self::AfterEndAndGoal => Ok(()),
        }
    }
}

impl std::fmt::Display for DisclosurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The slice of round state a policy looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyInput {
    /// End of the donation window.
    pub end_at: Timestamp,
    /// Current plaintext escrow balance.
    pub escrow: Amount,
    /// Goal threshold in native-currency units.
    pub goal: u64,
}

/// Why a policy refused to unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyRejection {
    /// The policy's rejection reason, e.g. `"policy: after end"`.
    pub reason: &'static str,
    /// The clause that failed: `"round not ended"`, `"goal not reached"`
    /// or `"never"`.
    pub clause: &'static str,
}

impl PolicyRejection {
    fn new(reason: &'static str, clause: &'static str) -> Self {
        Self { reason, clause }
    }
}
