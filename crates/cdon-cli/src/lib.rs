//! # cdon-cli — Confidential Donation Rounds Command-Line Interface
//!
//! ## Subcommands
//!
//! - `id` — derive round ids and principal addresses from names
//! - `simulate` — replay a YAML scenario against an in-memory registry
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs` and the `*Args` structs.
//! - Round semantics live in `cdon-rounds`; handlers only drive it.

pub mod ids;
pub mod scenario;
pub mod simulate;
