//! # Round Records
//!
//! A round is one independently configured confidential donation campaign.
//! It is created once, mutated in place by donate, unlock and payout, and
//! never deleted.
//!
//! ## Derived status
//!
//! ```text
//! Upcoming (now < start_at) ──▶ Live (start_at ≤ now ≤ end_at) ──▶ Ended (now > end_at)
//! ```
//!
//! The status is computed from the clock, never stored. Two orthogonal
//! flags, `total_public_unlocked` and the escrow's `paid_out`, each flip
//! from false to true exactly once.

use serde::{Deserialize, Serialize};

use cdon_core::{Amount, Principal, RoundId, Timestamp};
use cdon_fhe::CiphertextHandle;

use crate::escrow::EscrowLedger;
use crate::policy::{DisclosurePolicy, PolicyInput};
use crate::tally::ConfidentialTally;

/// Time-derived lifecycle phase of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    /// Before the donation window opens.
    Upcoming,
    /// Donations accepted.
    Live,
    /// Window closed; unlock and payout possible.
    Ended,
}

impl RoundStatus {
    /// Status of a `[start_at, end_at]` window at `now`.
    pub fn at(start_at: Timestamp, end_at: Timestamp, now: Timestamp) -> Self {
        if now < start_at {
            Self::Upcoming
        } else if now <= end_at {
            Self::Live
        } else {
            Self::Ended
        }
    }

    /// The canonical string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "UPCOMING",
            Self::Live => "LIVE",
            Self::Ended => "ENDED",
        }
    }
}

impl std::fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of `create_round`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRound {
    /// Round identifier; must be fresh.
    pub id: RoundId,
    /// Receives the escrow on payout; must not be null.
    pub beneficiary: Principal,
    /// Goal threshold in native-currency units.
    pub goal: u64,
    /// Window start (inclusive).
    pub start_at: Timestamp,
    /// Window end (inclusive); must be after `start_at`.
    pub end_at: Timestamp,
    /// Disclosure policy for the aggregate total.
    pub policy: DisclosurePolicy,
    /// Free-text title.
    #[serde(default)]
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
}

/// A registered round.
///
/// Metadata fields are public for reading; the registry only hands out
/// shared references, so all mutation goes through its operations.
#[derive(Debug, Clone)]
pub struct Round {
    /// Round identifier.
    pub id: RoundId,
    /// The creator.
    pub owner: Principal,
    /// Payout recipient.
    pub beneficiary: Principal,
    /// Goal threshold.
    pub goal: u64,
    /// Window start.
    pub start_at: Timestamp,
    /// Window end.
    pub end_at: Timestamp,
    /// Disclosure policy.
    pub policy: DisclosurePolicy,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Host time when the round was created.
    pub created_at: Timestamp,
    pub(crate) total_public_unlocked: bool,
    pub(crate) tally: ConfidentialTally,
    pub(crate) escrow: EscrowLedger,
}

impl Round {
    pub(crate) fn new(
        params: NewRound,
        owner: Principal,
        created_at: Timestamp,
        encrypted_zero: CiphertextHandle,
    ) -> Self {
        Self {
            id: params.id,
            owner,
            beneficiary: params.beneficiary,
            goal: params.goal,
            start_at: params.start_at,
            end_at: params.end_at,
            policy: params.policy,
            title: params.title,
            description: params.description,
            created_at,
            total_public_unlocked: false,
            tally: ConfidentialTally::new(encrypted_zero),
            escrow: EscrowLedger::new(),
        }
    }

    /// Lifecycle phase at `now`.
    pub fn status(&self, now: Timestamp) -> RoundStatus {
        RoundStatus::at(self.start_at, self.end_at, now)
    }

    /// Whether the aggregate total has been made public.
    pub fn is_total_public(&self) -> bool {
        self.total_public_unlocked
    }

    /// Whether the payout has happened.
    pub fn is_paid_out(&self) -> bool {
        self.escrow.is_paid_out()
    }

    /// The encrypted tally.
    pub fn tally(&self) -> &ConfidentialTally {
        &self.tally
    }

    /// The plaintext escrow ledger.
    pub fn escrow(&self) -> &EscrowLedger {
        &self.escrow
    }

    /// What the disclosure policy gets to see.
    pub fn policy_input(&self) -> PolicyInput {
        PolicyInput {
            end_at: self.end_at,
            escrow: self.escrow.balance(),
            goal: self.goal,
        }
    }

    /// A serializable snapshot of the public fields.
    pub fn view(&self) -> RoundView {
        RoundView {
            id: self.id,
            owner: self.owner,
            beneficiary: self.beneficiary,
            goal: self.goal,
            start_at: self.start_at,
            end_at: self.end_at,
            policy: self.policy,
            escrow: self.escrow.balance(),
            raised: self.escrow.raised(),
            paid_out: self.escrow.is_paid_out(),
            total_public_unlocked: self.total_public_unlocked,
            title: self.title.clone(),
            description: self.description.clone(),
            created_at: self.created_at,
            donor_count: self.tally.donor_count(),
        }
    }
}

/// Serializable snapshot of a round's public state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundView {
    /// Round identifier.
    pub id: RoundId,
    /// The creator.
    pub owner: Principal,
    /// Payout recipient.
    pub beneficiary: Principal,
    /// Goal threshold.
    pub goal: u64,
    /// Window start.
    pub start_at: Timestamp,
    /// Window end.
    pub end_at: Timestamp,
    /// Disclosure policy.
    pub policy: DisclosurePolicy,
    /// Balance awaiting payout.
    pub escrow: Amount,
    /// Cumulative payments received.
    pub raised: Amount,
    /// Whether the payout happened.
    pub paid_out: bool,
    /// Whether the aggregate is public.
    pub total_public_unlocked: bool,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Creation time.
    pub created_at: Timestamp,
    /// Number of distinct donors.
    pub donor_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: u64) -> Timestamp {
        Timestamp::from_epoch_secs(s)
    }

    #[test]
    fn status_boundaries_are_inclusive() {
        let (start, end) = (at(10), at(20));
        assert_eq!(RoundStatus::at(start, end, at(9)), RoundStatus::Upcoming);
        assert_eq!(RoundStatus::at(start, end, at(10)), RoundStatus::Live);
        assert_eq!(RoundStatus::at(start, end, at(20)), RoundStatus::Live);
        assert_eq!(RoundStatus::at(start, end, at(21)), RoundStatus::Ended);
    }

    #[test]
    fn status_display() {
        assert_eq!(RoundStatus::Live.to_string(), "LIVE");
    }

    #[test]
    fn new_round_defaults() {
        let params = NewRound {
            id: RoundId::from_label("r"),
            beneficiary: Principal::from_name("bene"),
            goal: 8,
            start_at: at(10),
            end_at: at(20),
            policy: DisclosurePolicy::AfterEnd,
            title: "t".into(),
            description: "d".into(),
        };
        let owner = Principal::from_name("owner");
        let zero = CiphertextHandle::from_bytes([1u8; 32]);
        let round = Round::new(params, owner, at(5), zero);
        let view = round.view();
        assert_eq!(view.owner, owner);
        assert_eq!(view.escrow, Amount::ZERO);
        assert!(!view.paid_out);
        assert!(!view.total_public_unlocked);
        assert_eq!(round.tally().aggregate(), zero);
        assert_eq!(view.donor_count, 0);
    }

    #[test]
    fn new_round_defaults_text_fields() {
        let json: serde_json::Value = serde_json::json!({
            "id": "0x0000000000000000000000000000000000000000000000000000000000000001",
            "beneficiary": "0x0000000000000000000000000000000000000002",
            "goal": 8,
            "start_at": 10,
            "end_at": 20,
            "policy": "after_end"
        });
        let params: NewRound = serde_json::from_value(json).unwrap();
        assert!(params.title.is_empty());
        assert_eq!(params.policy, DisclosurePolicy::AfterEnd);
    }
}
