//! # Confidential Tally
//!
//! Per-round encrypted bookkeeping: one aggregate handle plus one subtotal
//! handle per donor. All arithmetic happens in the encryption backend; the
//! tally only remembers which handle is current.
//!
//! ## Two-phase update
//!
//! A contribution is first *staged*: the backend computes the new aggregate
//! and the new subtotal while the tally is left untouched. The registry
//! commits the staged handles only after every other check of the donation
//! has passed, so a failed donation leaves no trace in round state.
//!
//! ## Invariant
//!
//! `decrypt(aggregate) == Σ decrypt(subtotal[d])` over all donors `d`,
//! because every staged contribution adds the same input handle to both.

use std::collections::BTreeMap;

use cdon_core::Principal;
use cdon_fhe::{CiphertextHandle, EncryptionBackend, FheError};

/// Encrypted aggregate and per-donor subtotals of one round.
#[derive(Debug, Clone)]
pub struct ConfidentialTally {
    aggregate: CiphertextHandle,
    subtotals: BTreeMap<Principal, CiphertextHandle>,
    contributions: u64,
}

/// Handles computed for one contribution, not yet applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagedContribution {
    /// The donor the contribution belongs to.
    pub donor: Principal,
    /// Aggregate handle after the contribution.
    pub aggregate: CiphertextHandle,
    /// Donor subtotal handle after the contribution.
    pub subtotal: CiphertextHandle,
    /// Whether this is the donor's first contribution.
    pub first_contribution: bool,
}

impl ConfidentialTally {
    /// A tally whose aggregate is `encrypted_zero` and with no donors.
    pub fn new(encrypted_zero: CiphertextHandle) -> Self {
        Self {
            aggregate: encrypted_zero,
            subtotals: BTreeMap::new(),
            contributions: 0,
        }
    }

    /// The current aggregate handle.
    pub fn aggregate(&self) -> CiphertextHandle {
        self.aggregate
    }

    /// The donor's current subtotal handle, if they ever contributed.
    pub fn subtotal_of(&self, donor: &Principal) -> Option<CiphertextHandle> {
        self.subtotals.get(donor).copied()
    }

    /// Donors in ascending principal order with their subtotal handles.
    pub fn subtotals(&self) -> impl Iterator<Item = (&Principal, &CiphertextHandle)> + '_ {
        self.subtotals.iter()
    }

    /// Number of distinct donors.
    pub fn donor_count(&self) -> usize {
        self.subtotals.len()
    }

    /// Number of committed contributions (a donor may contribute many times).
    pub fn contribution_count(&self) -> u64 {
        self.contributions
    }

    /// Compute the handles that result from adding `amount` for `donor`.
    ///
    /// A first-time donor's subtotal starts from a fresh encryption of zero.
    pub fn stage<B: EncryptionBackend + ?Sized>(
        &self,
        backend: &B,
        donor: Principal,
        amount: &CiphertextHandle,
    ) -> Result<StagedContribution, FheError> {
        let (current, first_contribution) = match self.subtotals.get(&donor) {
            Some(handle) => (*handle, false),
            None => (backend.trivial_encrypt(0), true),
        };
        let aggregate = backend.add(&self.aggregate, amount)?;
        let subtotal = backend.add(&current, amount)?;
        Ok(StagedContribution {
            donor,
            aggregate,
            subtotal,
            first_contribution,
        })
    }

    /// Apply a staged contribution.
    pub fn commit(&mut self, staged: StagedContribution) {
        self.aggregate = staged.aggregate;
        self.subtotals.insert(staged.donor, staged.subtotal);
        self.contributions += 1;
    }
}
