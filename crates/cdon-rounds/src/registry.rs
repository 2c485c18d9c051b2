//! # Round Registry
//!
//! Owns every round and composes the per-round tally and escrow with the
//! registry-wide ACL and event log.
//!
//! ## Storage
//!
//! Rounds live in an append-only arena (`Vec<Round>`) indexed by a
//! `HashMap<RoundId, usize>`. Indices never move, so enumeration follows
//! creation order and an index read before an external call stays valid
//! after it.
//!
//! ## Atomicity
//!
//! Each mutation first performs every fallible step against a staged copy
//! (proof check, homomorphic adds, escrow arithmetic) and only then commits
//! round fields, ACL grants and the event in one infallible block. An error
//! return therefore means nothing changed.
//!
//! ## Security Invariant
//!
//! `payout` flips the paid-out flag and zeroes the escrow *before* calling
//! the host transfer. A transfer sink that re-enters `payout` for the same
//! round gets [`RoundError::AlreadyPaidOut`]. If the transfer fails, the
//! registry is restored to its state before the payout began, discarding
//! anything the sink committed through its registry handle.
//!
//! A paid-out round accepts no further donations, whatever the clock says,
//! so a paid-out escrow always holds zero.

use std::collections::HashMap;
use std::sync::Arc;

use cdon_core::{Amount, Principal, RoundId, Timestamp};
use cdon_fhe::{CiphertextHandle, DecryptError, EncryptionBackend, InputProof};

use crate::acl::AccessControlList;
use crate::config::RegistryConfig;
use crate::error::{RoundError, WindowClosed};
use crate::events::{EventLog, RoundEvent};
use crate::host::{CallContext, NativeTransfer};
use crate::round::{NewRound, Round, RoundStatus};

/// Result of [`RoundRegistry::maybe_make_total_public`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// The total became public by this call.
    Unlocked,
    /// The total was already public; nothing changed.
    AlreadyUnlocked,
}

/// Derived status of a round plus its two one-way flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    /// Time-derived phase.
    pub status: RoundStatus,
    /// Whether the aggregate is public.
    pub total_public_unlocked: bool,
    /// Whether the escrow was paid out.
    pub paid_out: bool,
}

/// Registry state captured before an external transfer.
struct Snapshot {
    rounds: Vec<Round>,
    index: HashMap<RoundId, usize>,
    acl: AccessControlList,
    events: usize,
}

/// The collection of rounds and the operations on them.
pub struct RoundRegistry<B: EncryptionBackend> {
    backend: Arc<B>,
    config: RegistryConfig,
    rounds: Vec<Round>,
    index: HashMap<RoundId, usize>,
    acl: AccessControlList,
    events: EventLog,
}

impl<B: EncryptionBackend> std::fmt::Debug for RoundRegistry<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundRegistry")
            .field("config", &self.config)
            .field("rounds", &self.rounds.len())
            .field("events", &self.events.len())
            .finish()
    }
}

impl<B: EncryptionBackend> RoundRegistry<B> {
    /// An empty registry over `backend`.
    pub fn new(backend: Arc<B>, config: RegistryConfig) -> Self {
        Self {
            backend,
            config,
            rounds: Vec::new(),
            index: HashMap::new(),
            acl: AccessControlList::new(),
            events: EventLog::new(),
        }
    }

    /// The encryption backend.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// The active configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Protocol identifier encrypted inputs are bound to.
    pub fn protocol_id(&self) -> u64 {
        self.config.protocol_id
    }

    /// The decryption ACL.
    pub fn acl(&self) -> &AccessControlList {
        &self.acl
    }

    /// The event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    fn index_of(&self, id: &RoundId) -> Result<usize, RoundError> {
        self.index
            .get(id)
            .copied()
            .ok_or(RoundError::RoundNotFound(*id))
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            rounds: self.rounds.clone(),
            index: self.index.clone(),
            acl: self.acl.clone(),
            events: self.events.len(),
        }
    }

    /// Roll back everything committed since `snapshot`, including effects
    /// of calls a transfer sink made through its registry handle.
    fn restore(&mut self, snapshot: Snapshot) {
        self.rounds = snapshot.rounds;
        self.index = snapshot.index;
        self.acl = snapshot.acl;
        self.events.truncate(snapshot.events);
    }

    // -- Mutations ---------------------------------------------------------

    /// Register a new round owned by `ctx.caller`.
    pub fn create_round(&mut self, ctx: &CallContext, params: NewRound) -> Result<&Round, RoundError> {
        let id = params.id;
        if self.index.contains_key(&id) {
            tracing::debug!(round_id = %id, "create rejected: id taken");
            return Err(RoundError::RoundAlreadyExists(id));
        }
        if params.start_at >= params.end_at {
            return Err(RoundError::InvalidTimeWindow {
                start_at: params.start_at.epoch_secs(),
                end_at: params.end_at.epoch_secs(),
            });
        }
        if params.beneficiary.is_null() {
            return Err(RoundError::ZeroBeneficiary);
        }
        check_len("title", &params.title, self.config.max_title_len)?;
        check_len(
            "description",
            &params.description,
            self.config.max_description_len,
        )?;

        let encrypted_zero = self.backend.trivial_encrypt(0);
        let event = RoundEvent::RoundCreated {
            round_id: id,
            owner: ctx.caller,
            beneficiary: params.beneficiary,
            start_at: params.start_at,
            end_at: params.end_at,
            policy: params.policy,
            goal: params.goal,
            title: params.title.clone(),
            description: params.description.clone(),
        };

        let idx = self.rounds.len();
        self.rounds
            .push(Round::new(params, ctx.caller, ctx.now, encrypted_zero));
        self.index.insert(id, idx);
        self.acl.grant(encrypted_zero, ctx.caller);
        self.events.append(ctx.now, event);

        tracing::info!(round_id = %id, owner = %ctx.caller, "round created");
        Ok(&self.rounds[idx])
    }

    /// Accept an encrypted pledge with `ctx.value` attached as payment.
    ///
    /// The pledge and the payment are independent quantities; nothing ties
    /// the encrypted value to the plaintext amount.
    pub fn donate(
        &mut self,
        ctx: &CallContext,
        id: &RoundId,
        encrypted_amount: &CiphertextHandle,
        proof: &InputProof,
    ) -> Result<(), RoundError> {
        let idx = self.index_of(id)?;
        let round = &self.rounds[idx];

        match round.status(ctx.now) {
            RoundStatus::Upcoming => {
                tracing::debug!(round_id = %id, "donation rejected: not started");
                return Err(RoundError::DonationWindowClosed(WindowClosed::NotStarted));
            }
            RoundStatus::Ended => {
                tracing::debug!(round_id = %id, "donation rejected: ended");
                return Err(RoundError::DonationWindowClosed(WindowClosed::Ended));
            }
            RoundStatus::Live => {}
        }
        if round.escrow.is_paid_out() {
            tracing::debug!(round_id = %id, "donation rejected: already paid out");
            return Err(RoundError::DonationWindowClosed(WindowClosed::Ended));
        }
        if !self
            .backend
            .verify_proof(encrypted_amount, proof, &ctx.caller)
        {
            tracing::debug!(round_id = %id, donor = %ctx.caller, "donation rejected: invalid proof");
            return Err(RoundError::ProofInvalid);
        }

        let deposit = round.escrow.stage_deposit(ctx.value)?;
        let staged = round
            .tally
            .stage(self.backend.as_ref(), ctx.caller, encrypted_amount)?;
        let owner = round.owner;
        let unlocked = round.total_public_unlocked;

        let round = &mut self.rounds[idx];
        round.tally.commit(staged);
        round.escrow.commit_deposit(deposit);
        self.acl.grant(staged.subtotal, ctx.caller);
        self.acl.grant(staged.aggregate, owner);
        if unlocked {
            self.acl.grant_public(staged.aggregate);
        }
        self.events.append(
            ctx.now,
            RoundEvent::Donated {
                round_id: *id,
                donor: ctx.caller,
                amount: ctx.value,
            },
        );

        tracing::info!(
            round_id = %id,
            donor = %ctx.caller,
            payment = %ctx.value,
            first = staged.first_contribution,
            "donation accepted"
        );
        Ok(())
    }

    /// Make the round's aggregate publicly decryptable if its disclosure
    /// policy allows it. Anyone may call this.
    pub fn maybe_make_total_public(
        &mut self,
        ctx: &CallContext,
        id: &RoundId,
    ) -> Result<UnlockOutcome, RoundError> {
        let idx = self.index_of(id)?;
        let round = &self.rounds[idx];
        if round.total_public_unlocked {
            return Ok(UnlockOutcome::AlreadyUnlocked);
        }
        if let Err(rejection) = round.policy.evaluate(&round.policy_input(), ctx.now) {
            tracing::debug!(
                round_id = %id,
                reason = rejection.reason,
                clause = rejection.clause,
                "unlock rejected"
            );
            return Err(RoundError::PolicyNotSatisfied {
                reason: rejection.reason.to_string(),
            });
        }

        let aggregate = round.tally.aggregate();
        self.rounds[idx].total_public_unlocked = true;
        self.acl.grant_public(aggregate);
        self.events
            .append(ctx.now, RoundEvent::TotalPublicUnlocked { round_id: *id });

        tracing::info!(round_id = %id, "total made public");
        Ok(UnlockOutcome::Unlocked)
    }

    /// Transfer the whole escrow to the beneficiary, once.
    ///
    /// Only the owner may call this, and only after the round has ended.
    /// Returns the amount transferred.
    pub fn payout(
        &mut self,
        ctx: &CallContext,
        id: &RoundId,
        transfer: &mut dyn NativeTransfer<B>,
    ) -> Result<Amount, RoundError> {
        let idx = self.index_of(id)?;
        let round = &self.rounds[idx];
        if ctx.caller != round.owner {
            tracing::debug!(round_id = %id, caller = %ctx.caller, "payout rejected: not owner");
            return Err(RoundError::NotRoundOwner);
        }
        if ctx.now <= round.end_at {
            tracing::debug!(round_id = %id, "payout rejected: not ended");
            return Err(RoundError::RoundNotEnded);
        }
        let beneficiary = round.beneficiary;
        if round.escrow.is_paid_out() {
            return Err(RoundError::AlreadyPaidOut);
        }

        let snapshot = self.snapshot();
        let amount = self.rounds[idx].escrow.begin_payout()?;
        if let Err(err) = transfer.transfer(self, &beneficiary, amount) {
            self.restore(snapshot);
            tracing::warn!(round_id = %id, error = %err, "payout transfer failed, reverted");
            return Err(RoundError::TransferFailed(err.reason));
        }
        self.events.append(
            ctx.now,
            RoundEvent::Payout {
                round_id: *id,
                beneficiary,
                amount,
            },
        );

        tracing::info!(round_id = %id, beneficiary = %beneficiary, amount = %amount, "payout");
        Ok(amount)
    }

    // -- Queries -----------------------------------------------------------

    /// The round registered under `id`.
    pub fn get_round(&self, id: &RoundId) -> Result<&Round, RoundError> {
        self.index_of(id).map(|idx| &self.rounds[idx])
    }

    /// Whether a round is registered under `id`.
    pub fn exists(&self, id: &RoundId) -> bool {
        self.index.contains_key(id)
    }

    /// All round ids in creation order.
    pub fn get_all_round_ids(&self) -> Vec<RoundId> {
        self.round_ids().collect()
    }

    /// Iterate round ids in creation order.
    pub fn round_ids(&self) -> impl Iterator<Item = RoundId> + '_ {
        self.rounds.iter().map(|r| r.id)
    }

    /// All rounds in creation order.
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// Derived status and flags of a round at `now`.
    pub fn round_status(&self, id: &RoundId, now: Timestamp) -> Result<StatusReport, RoundError> {
        let round = self.get_round(id)?;
        Ok(StatusReport {
            status: round.status(now),
            total_public_unlocked: round.is_total_public(),
            paid_out: round.is_paid_out(),
        })
    }

    /// The round's aggregate handle, or [`CiphertextHandle::NULL`] for an
    /// unknown round. Whether it can be decrypted is up to the ACL.
    pub fn get_total_handle(&self, id: &RoundId) -> CiphertextHandle {
        self.get_round(id)
            .map(|r| r.tally.aggregate())
            .unwrap_or(CiphertextHandle::NULL)
    }

    /// `caller`'s subtotal handle, or [`CiphertextHandle::NULL`] if they
    /// never donated (or the round is unknown).
    pub fn get_my_total(&self, id: &RoundId, caller: &Principal) -> CiphertextHandle {
        self.get_round(id)
            .ok()
            .and_then(|r| r.tally.subtotal_of(caller))
            .unwrap_or(CiphertextHandle::NULL)
    }

    /// Decrypt `handle` on behalf of `principal`, gated by the ACL.
    pub fn decrypt(
        &self,
        handle: &CiphertextHandle,
        principal: &Principal,
    ) -> Result<u64, DecryptError> {
        self.backend.decrypt(handle, principal, &self.acl)
    }

    /// Number of registered rounds.
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    /// Whether no round is registered.
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), RoundError> {
    if value.len() > max {
        return Err(RoundError::InvalidMetadata {
            field,
            max,
            actual: value.len(),
        });
    }
    Ok(())
}
