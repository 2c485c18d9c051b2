//! # cdon-core — Foundational Types for Confidential Donation Rounds
//!
//! The leaf crate of the workspace. It defines the primitives every other
//! crate builds on and depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `RoundId`, `Principal`,
//!    `Timestamp` and `Amount` are distinct types. A round id cannot be
//!    passed where a principal is expected.
//!
//! 2. **Unsigned epoch timestamps.** The host ledger supplies time as whole
//!    seconds since the Unix epoch. `Timestamp` keeps that representation
//!    and only renders ISO8601 for display.
//!
//! 3. **Checked plaintext arithmetic.** `Amount` exposes `checked_add`, never
//!    a wrapping `+`. Escrow balances cannot silently overflow.
//!
//! 4. **One digest path.** Label-derived identifiers and mock handles all go
//!    through [`sha256()`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cdon-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod amount;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

pub use amount::Amount;
pub use digest::{from_hex, sha256, sha256_concat, to_hex};
pub use error::CoreError;
pub use identity::{Principal, RoundId};
pub use temporal::Timestamp;
