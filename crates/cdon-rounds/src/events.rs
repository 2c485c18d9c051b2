//! # Round Event Log
//!
//! Append-only log of committed round mutations. Every successful mutation
//! appends exactly one event; a failed mutation appends nothing. Each event
//! is keyed by its round id.

use serde::{Deserialize, Serialize};

use cdon_core::{Amount, Principal, RoundId, Timestamp};

use crate::policy::DisclosurePolicy;

/// A committed round mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RoundEvent {
    /// A round was registered.
    RoundCreated {
        /// Round identifier.
        round_id: RoundId,
        /// The creator.
        owner: Principal,
        /// Payout recipient.
        beneficiary: Principal,
        /// Window start.
        start_at: Timestamp,
        /// Window end.
        end_at: Timestamp,
        /// Disclosure policy.
        policy: DisclosurePolicy,
        /// Goal threshold.
        goal: u64,
        /// Title.
        title: String,
        /// Description.
        description: String,
    },
    /// A donation was accepted. Only the plaintext payment is disclosed.
    Donated {
        /// Round identifier.
        round_id: RoundId,
        /// The donor.
        donor: Principal,
        /// Attached plaintext payment.
        amount: Amount,
    },
    /// The aggregate total became publicly decryptable.
    TotalPublicUnlocked {
        /// Round identifier.
        round_id: RoundId,
    },
    /// The escrow was paid out.
    Payout {
        /// Round identifier.
        round_id: RoundId,
        /// Recipient.
        beneficiary: Principal,
        /// Amount transferred.
        amount: Amount,
    },
}

impl RoundEvent {
    /// The round this event belongs to.
    pub fn round_id(&self) -> &RoundId {
        match self {
            Self::RoundCreated { round_id, .. }
            | Self::Donated { round_id, .. }
            | Self::TotalPublicUnlocked { round_id }
            | Self::Payout { round_id, .. } => round_id,
        }
    }

    /// Short event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RoundCreated { .. } => "RoundCreated",
            Self::Donated { .. } => "Donated",
            Self::TotalPublicUnlocked { .. } => "TotalPublicUnlocked",
            Self::Payout { .. } => "Payout",
        }
    }
}

/// An event with its position in the log and the host time it was emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Zero-based position in the log.
    pub seq: u64,
    /// Host time of the emitting operation.
    pub at: Timestamp,
    /// The event.
    #[serde(flatten)]
    pub event: RoundEvent,
}

/// Append-only event log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, at: Timestamp, event: RoundEvent) {
        let seq = self.records.len() as u64;
        self.records.push(EventRecord { seq, at, event });
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }

    /// All records in emission order.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records for one round, in emission order.
    pub fn for_round<'a>(&'a self, id: &'a RoundId) -> impl Iterator<Item = &'a EventRecord> + 'a {
        self.records.iter().filter(move |r| r.event.round_id() == id)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_assigns_sequence() {
        let mut log = EventLog::new();
        let a = RoundId::from_label("a");
        let b = RoundId::from_label("b");
        log.append(Timestamp::from_epoch_secs(1), RoundEvent::TotalPublicUnlocked { round_id: a });
        log.append(Timestamp::from_epoch_secs(2), RoundEvent::TotalPublicUnlocked { round_id: b });
        log.append(Timestamp::from_epoch_secs(3), RoundEvent::TotalPublicUnlocked { round_id: a });

        let seqs: Vec<u64> = log.records().iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(log.for_round(&a).count(), 2);
        assert_eq!(log.for_round(&b).count(), 1);
    }

    #[test]
    fn json_shape_is_tagged_and_flat() {
        let mut log = EventLog::new();
        let id = RoundId::from_label("r");
        log.append(
            Timestamp::from_epoch_secs(7),
            RoundEvent::Donated {
                round_id: id,
                donor: Principal::from_name("alice"),
                amount: Amount::new(3),
            },
        );
        let value = serde_json::to_value(&log.records()[0]).unwrap();
        assert_eq!(value["event"], "donated");
        assert_eq!(value["seq"], 0);
        assert_eq!(value["at"], 7);
        assert_eq!(value["amount"], "3");
        assert_eq!(value["round_id"], id.to_hex());
    }

    #[test]
    fn names() {
        let id = RoundId::from_label("r");
        assert_eq!(RoundEvent::TotalPublicUnlocked { round_id: id }.name(), "TotalPublicUnlocked");
    }
}
