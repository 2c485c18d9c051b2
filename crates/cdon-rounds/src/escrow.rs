//! # Escrow Ledger
//!
//! Plaintext native-currency balance held by one round, pending a single
//! payout to the beneficiary. The balance is independent of the encrypted
//! pledges: nothing requires the two to be equal.
//!
//! ## Status machine
//!
//! ```text
//! Open ──deposit()*──▶ Open ──begin_payout()──▶ PaidOut (terminal)
//! ```
//!
//! A failed host transfer is rolled back by the registry restoring its
//! pre-payout copy of the ledger.
//!
//! ## Security Invariant
//!
//! `begin_payout()` flips `paid_out` and zeroes the balance *before* the
//! caller performs the external transfer. Any re-entrant payout observed
//! during that transfer finds `paid_out == true` and fails. `raised` keeps
//! the cumulative amount received and is never reset.

use serde::{Deserialize, Serialize};

use cdon_core::Amount;

use crate::error::RoundError;

/// Plaintext balance and payout flag of one round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowLedger {
    balance: Amount,
    raised: Amount,
    paid_out: bool,
}

/// A deposit whose arithmetic has been checked but not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagedDeposit {
    balance: Amount,
    raised: Amount,
}

impl EscrowLedger {
    /// An empty, open ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance awaiting payout.
    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Cumulative payments received, unaffected by payout.
    pub fn raised(&self) -> Amount {
        self.raised
    }

    /// Whether the single payout has happened.
    pub fn is_paid_out(&self) -> bool {
        self.paid_out
    }

    /// Check that `payment` can be credited without overflow.
    pub fn stage_deposit(&self, payment: Amount) -> Result<StagedDeposit, RoundError> {
        let overflow = || RoundError::EscrowOverflow {
            balance: self.balance,
            payment,
        };
        let balance = self.balance.checked_add(payment).ok_or_else(overflow)?;
        let raised = self.raised.checked_add(payment).ok_or_else(overflow)?;
        Ok(StagedDeposit { balance, raised })
    }

    /// Apply a staged deposit.
    pub fn commit_deposit(&mut self, staged: StagedDeposit) {
        self.balance = staged.balance;
        self.raised = staged.raised;
    }

    /// Mark the ledger paid out and zero the balance, returning the amount
    /// that must now be transferred.
    pub fn begin_payout(&mut self) -> Result<Amount, RoundError> {
        if self.paid_out {
            return Err(RoundError::AlreadyPaidOut);
        }
        let amount = self.balance;
        self.paid_out = true;
        self.balance = Amount::ZERO;
        Ok(amount)
    }
}
