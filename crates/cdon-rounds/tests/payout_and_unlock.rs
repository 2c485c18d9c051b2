//! # Payout and Unlock Tests
//!
//! Once-only payout (including a transfer sink that re-enters the registry
//! and one that refuses the transfer) and unlock idempotence.

use std::sync::Arc;

use cdon_core::{Amount, Principal, RoundId, Timestamp};
use cdon_fhe::{EncryptionBackend, MockBackend};
use cdon_rounds::{
    CallContext, DisclosurePolicy, InMemoryTransfer, NativeTransfer, NewRound, RegistryConfig,
    RoundError, RoundEvent, RoundRegistry, TransferError, UnlockOutcome,
};
use proptest::prelude::*;

const START: u64 = 10_000;
const END: u64 = 20_000;

fn at(secs: u64) -> Timestamp {
    Timestamp::from_epoch_secs(secs)
}

fn owner() -> Principal {
    Principal::from_name("owner")
}

fn beneficiary() -> Principal {
    Principal::from_name("beneficiary")
}

/// A registry holding one AfterEnd round with `payments` already donated.
fn funded(payments: &[u128]) -> (RoundRegistry<MockBackend>, RoundId) {
    let mut reg = RoundRegistry::new(Arc::new(MockBackend::new()), RegistryConfig::default());
    let id = RoundId::from_label("fund");
    reg.create_round(
        &CallContext::new(owner(), at(START)),
        NewRound {
            id,
            beneficiary: beneficiary(),
            goal: 0,
            start_at: at(START),
            end_at: at(END),
            policy: DisclosurePolicy::AfterEnd,
            title: String::new(),
            description: String::new(),
        },
    )
    .unwrap();
    for (i, p) in payments.iter().enumerate() {
        let donor = Principal::from_name(&format!("donor-{i}"));
        let (h, proof) = reg.backend().encrypt(1, &donor);
        let ctx = CallContext::new(donor, at(START + 1)).with_value(Amount::new(*p));
        reg.donate(&ctx, &id, &h, &proof).unwrap();
    }
    (reg, id)
}

fn payout_events(reg: &RoundRegistry<MockBackend>, id: &RoundId) -> usize {
    reg.events()
        .for_round(id)
        .filter(|r| matches!(r.event, RoundEvent::Payout { .. }))
        .count()
}

#[test]
fn payout_transfers_escrow_once() {
    let (mut reg, id) = funded(&[3, 5]);
    let mut sink = InMemoryTransfer::new();
    let ctx = CallContext::new(owner(), at(END + 1));

    assert_eq!(reg.payout(&ctx, &id, &mut sink).unwrap(), Amount::new(8));
    assert_eq!(sink.credited(&beneficiary()), Amount::new(8));

    let r = reg.get_round(&id).unwrap();
    assert!(r.is_paid_out());
    assert_eq!(r.escrow().balance(), Amount::ZERO);
    assert_eq!(r.escrow().raised(), Amount::new(8));

    assert_eq!(
        reg.payout(&ctx, &id, &mut sink).unwrap_err(),
        RoundError::AlreadyPaidOut
    );
    assert_eq!(sink.log().len(), 1);
    assert_eq!(payout_events(&reg, &id), 1);
}

#[test]
fn payout_checks_owner_then_time() {
    let (mut reg, id) = funded(&[4]);
    let mut sink = InMemoryTransfer::new();

    let stranger = CallContext::new(Principal::from_name("stranger"), at(START + 2));
    assert_eq!(
        reg.payout(&stranger, &id, &mut sink).unwrap_err(),
        RoundError::NotRoundOwner
    );

    // `end_at` itself is still live.
    let at_end = CallContext::new(owner(), at(END));
    let err = reg.payout(&at_end, &id, &mut sink).unwrap_err();
    assert_eq!(err, RoundError::RoundNotEnded);
    assert_eq!(err.to_string(), "not ended");

    assert!(sink.log().is_empty());
    assert_eq!(
        reg.get_round(&id).unwrap().escrow().balance(),
        Amount::new(4)
    );
}

#[test]
fn payout_of_unknown_round() {
    let (mut reg, _) = funded(&[]);
    let ghost = RoundId::from_label("ghost");
    let ctx = CallContext::new(owner(), at(END + 1));
    assert_eq!(
        reg.payout(&ctx, &ghost, &mut InMemoryTransfer::new())
            .unwrap_err(),
        RoundError::RoundNotFound(ghost)
    );
}

/// Calls `payout` again from inside the transfer.
struct Reentrant {
    ctx: CallContext,
    id: RoundId,
    nested: Option<Result<Amount, RoundError>>,
    observed_balance: Option<Amount>,
}

impl NativeTransfer<MockBackend> for Reentrant {
    fn transfer(
        &mut self,
        registry: &mut RoundRegistry<MockBackend>,
        _to: &Principal,
        _amount: Amount,
    ) -> Result<(), TransferError> {
        self.observed_balance = registry
            .get_round(&self.id)
            .ok()
            .map(|r| r.escrow().balance());
        let mut inner = InMemoryTransfer::new();
        self.nested = Some(registry.payout(&self.ctx, &self.id, &mut inner));
        Ok(())
    }
}

#[test]
fn reentrant_payout_is_rejected() {
    let (mut reg, id) = funded(&[6]);
    let ctx = CallContext::new(owner(), at(END + 1));
    let mut sink = Reentrant {
        ctx,
        id,
        nested: None,
        observed_balance: None,
    };

    assert_eq!(reg.payout(&ctx, &id, &mut sink).unwrap(), Amount::new(6));
    assert_eq!(sink.nested, Some(Err(RoundError::AlreadyPaidOut)));
    assert_eq!(sink.observed_balance, Some(Amount::ZERO));
    assert_eq!(payout_events(&reg, &id), 1);
}

/// Refuses every transfer.
struct Refusing;

impl NativeTransfer<MockBackend> for Refusing {
    fn transfer(
        &mut self,
        _registry: &mut RoundRegistry<MockBackend>,
        _to: &Principal,
        _amount: Amount,
    ) -> Result<(), TransferError> {
        Err(TransferError::new("recipient rejected value"))
    }
}

#[test]
fn failed_transfer_reverts_payout() {
    let (mut reg, id) = funded(&[2, 2]);
    let ctx = CallContext::new(owner(), at(END + 1));

    let err = reg.payout(&ctx, &id, &mut Refusing).unwrap_err();
    assert_eq!(
        err,
        RoundError::TransferFailed("recipient rejected value".to_string())
    );
    let r = reg.get_round(&id).unwrap();
    assert!(!r.is_paid_out());
    assert_eq!(r.escrow().balance(), Amount::new(4));
    assert_eq!(payout_events(&reg, &id), 0);

    // A later attempt with a working sink succeeds.
    let mut sink = InMemoryTransfer::new();
    assert_eq!(reg.payout(&ctx, &id, &mut sink).unwrap(), Amount::new(4));
}

/// Unlocks the round through its registry handle, then refuses the transfer.
struct UnlockThenRefuse {
    ctx: CallContext,
    id: RoundId,
    nested: Option<Result<UnlockOutcome, RoundError>>,
}

impl NativeTransfer<MockBackend> for UnlockThenRefuse {
    fn transfer(
        &mut self,
        registry: &mut RoundRegistry<MockBackend>,
        _to: &Principal,
        _amount: Amount,
    ) -> Result<(), TransferError> {
        self.nested = Some(registry.maybe_make_total_public(&self.ctx, &self.id));
        Err(TransferError::new("refused"))
    }
}

#[test]
fn failed_transfer_discards_nested_mutations() {
    let (mut reg, id) = funded(&[5]);
    let ctx = CallContext::new(owner(), at(END + 1));
    let events = reg.events().len();
    let aggregate = reg.get_total_handle(&id);
    let mut sink = UnlockThenRefuse {
        ctx,
        id,
        nested: None,
    };

    let err = reg.payout(&ctx, &id, &mut sink).unwrap_err();
    assert_eq!(err, RoundError::TransferFailed("refused".to_string()));
    assert_eq!(sink.nested, Some(Ok(UnlockOutcome::Unlocked)));

    let r = reg.get_round(&id).unwrap();
    assert!(!r.is_total_public());
    assert!(!r.is_paid_out());
    assert_eq!(r.escrow().balance(), Amount::new(5));
    assert!(!reg.acl().is_public(&aggregate));
    assert_eq!(reg.events().len(), events);

    // The unlock can still happen on its own afterwards.
    assert_eq!(
        reg.maybe_make_total_public(&ctx, &id).unwrap(),
        UnlockOutcome::Unlocked
    );
}

#[test]
fn unlock_twice_emits_once() {
    let (mut reg, id) = funded(&[1]);
    let ctx = CallContext::new(Principal::from_name("anyone"), at(END + 1));
    assert_eq!(
        reg.maybe_make_total_public(&ctx, &id).unwrap(),
        UnlockOutcome::Unlocked
    );
    assert_eq!(
        reg.maybe_make_total_public(&ctx, &id).unwrap(),
        UnlockOutcome::AlreadyUnlocked
    );
    let unlocks = reg
        .events()
        .for_round(&id)
        .filter(|r| matches!(r.event, RoundEvent::TotalPublicUnlocked { .. }))
        .count();
    assert_eq!(unlocks, 1);
}

proptest! {
    /// However many times and whenever unlock is attempted, the flag flips
    /// at most once, exactly one event is emitted per flip, and a public
    /// total never becomes private again.
    #[test]
    fn unlock_is_idempotent(offsets in prop::collection::vec(0u64..40_000, 1..20)) {
        let (mut reg, id) = funded(&[5]);
        let mut was_public = false;
        for off in offsets {
            let ctx = CallContext::new(owner(), at(START + off));
            let result = reg.maybe_make_total_public(&ctx, &id);
            let public = reg.get_round(&id).unwrap().is_total_public();
            prop_assert!(!was_public || public);
            if was_public {
                prop_assert_eq!(result, Ok(UnlockOutcome::AlreadyUnlocked));
            }
            was_public = public;
        }
        let unlocks = reg
            .events()
            .for_round(&id)
            .filter(|r| matches!(r.event, RoundEvent::TotalPublicUnlocked { .. }))
            .count();
        prop_assert_eq!(unlocks, usize::from(was_public));
    }

    /// The payout amount equals the sum of attached payments.
    #[test]
    fn payout_equals_sum_of_payments(payments in prop::collection::vec(0u128..1_000_000, 0..12)) {
        let (mut reg, id) = funded(&payments);
        let mut sink = InMemoryTransfer::new();
        let ctx = CallContext::new(owner(), at(END + 1));
        let paid = reg.payout(&ctx, &id, &mut sink).unwrap();
        prop_assert_eq!(paid, Amount::new(payments.iter().sum()));
        prop_assert_eq!(reg.get_round(&id).unwrap().escrow().balance(), Amount::ZERO);
    }
}
