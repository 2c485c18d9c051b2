//! # cdon-rounds — Confidential Donation Round Engine
//!
//! Time-boxed donation rounds whose individual and aggregate amounts stay
//! encrypted until an owner-chosen disclosure policy allows the aggregate
//! to become public.
//!
//! ## Architecture
//!
//! - **Registry** (`registry.rs`): [`RoundRegistry`] owns the rounds and
//!   exposes the four mutations (`create_round`, `donate`,
//!   `maybe_make_total_public`, `payout`) plus read-only queries.
//! - **Tally** (`tally.rs`): per-round encrypted aggregate and per-donor
//!   subtotals, updated by homomorphic addition in the backend.
//! - **ACL** (`acl.rs`): which principal may decrypt which handle. Answers
//!   the backend's [`DecryptionAuthority`](cdon_fhe::DecryptionAuthority)
//!   question.
//! - **Policy** (`policy.rs`): when a round's aggregate may be unlocked.
//! - **Escrow** (`escrow.rs`): plaintext balance and the single payout.
//! - **Host** (`host.rs`): call context and the value-transfer seam.
//! - **Events** (`events.rs`): append-only log of committed mutations.
//!
//! ## Crate Policy
//!
//! - Mutations take `&mut self`; the host serializes calls.
//! - Every mutation is all-or-nothing.
//! - No `unsafe`, no `.unwrap()` outside tests.

pub mod acl;
pub mod config;
pub mod error;
pub mod escrow;
pub mod events;
pub mod host;
pub mod policy;
pub mod registry;
pub mod round;
pub mod tally;

pub use acl::AccessControlList;
pub use config::RegistryConfig;
pub use error::{RoundError, WindowClosed};
pub use escrow::EscrowLedger;
pub use events::{EventLog, EventRecord, RoundEvent};
pub use host::{CallContext, InMemoryTransfer, NativeTransfer, TransferError};
pub use policy::DisclosurePolicy;
pub use registry::{RoundRegistry, StatusReport, UnlockOutcome};
pub use round::{NewRound, Round, RoundStatus, RoundView};
pub use tally::ConfidentialTally;
