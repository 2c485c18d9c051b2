//! # Host Ledger Interface
//!
//! What the surrounding execution environment supplies to each call: the
//! caller's identity, the clock reading, the attached native-currency value,
//! and a primitive that moves value out of the registry.

use std::collections::BTreeMap;

use thiserror::Error;

use cdon_core::{Amount, Principal, Timestamp};
use cdon_fhe::EncryptionBackend;

use crate::registry::RoundRegistry;

/// Per-call host context. Time is sampled once per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Authenticated caller.
    pub caller: Principal,
    /// Host time of the call.
    pub now: Timestamp,
    /// Native currency attached to the call.
    pub value: Amount,
}

impl CallContext {
    /// A call from `caller` at `now` with no attached value.
    pub fn new(caller: Principal, now: Timestamp) -> Self {
        Self {
            caller,
            now,
            value: Amount::ZERO,
        }
    }

    /// The same call with `value` attached.
    pub fn with_value(mut self, value: Amount) -> Self {
        self.value = value;
        self
    }
}

/// The host refused to move value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct TransferError {
    /// Host-supplied reason.
    pub reason: String,
}

impl TransferError {
    /// Construct from any displayable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Moves native currency from the registry to a recipient.
///
/// The sink receives the registry itself, so a recipient that calls back
/// into the registry during the transfer can be modelled. The registry has
/// already committed the payout flag when `transfer` runs.
pub trait NativeTransfer<B: EncryptionBackend> {
    /// Transfer `amount` to `to`.
    fn transfer(
        &mut self,
        registry: &mut RoundRegistry<B>,
        to: &Principal,
        amount: Amount,
    ) -> Result<(), TransferError>;
}

/// Records credits in memory. Never fails.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransfer {
    credits: BTreeMap<Principal, Amount>,
    log: Vec<(Principal, Amount)>,
}

impl InMemoryTransfer {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total credited to `who` so far.
    pub fn credited(&self, who: &Principal) -> Amount {
        self.credits.get(who).copied().unwrap_or(Amount::ZERO)
    }

    /// Every transfer in order.
    pub fn log(&self) -> &[(Principal, Amount)] {
        &self.log
    }
}

impl<B: EncryptionBackend> NativeTransfer<B> for InMemoryTransfer {
    fn transfer(
        &mut self,
        _registry: &mut RoundRegistry<B>,
        to: &Principal,
        amount: Amount,
    ) -> Result<(), TransferError> {
        let current = self.credited(to);
        let total = current
            .checked_add(amount)
            .ok_or_else(|| TransferError::new("recipient balance overflow"))?;
        self.credits.insert(*to, total);
        self.log.push((*to, amount));
        Ok(())
    }
}
