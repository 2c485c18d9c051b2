//! # cdon-fhe — Encryption Backend Abstraction
//!
//! Defines the seam between the round engine and whatever homomorphic
//! encryption scheme the host provides.
//!
//! ## Architecture
//!
//! - **Traits** (`traits.rs`): `EncryptionBackend` is the contract every
//!   backend satisfies: encrypt, homomorphic add, input-proof verification
//!   and authority-gated decryption. `DecryptionAuthority` is the question
//!   the backend asks before releasing a plaintext; the round engine's ACL
//!   answers it.
//!
//! - **Mock** (`mock.rs`): `MockBackend` stores plaintexts behind opaque
//!   handles and performs the equivalent plaintext arithmetic. It is
//!   deterministic, so tests can assert exact handles and values.
//!
//! The round engine never touches ciphertext bytes. It holds
//! [`CiphertextHandle`]s and calls the trait.
//!
//! ## Crate Policy
//!
//! - Depends on `cdon-core` only.
//! - The mock backend sits behind the default `mock` feature.
//! - No `unsafe`.

#[cfg(feature = "mock")]
pub mod mock;
pub mod traits;

#[cfg(feature = "mock")]
pub use mock::MockBackend;
pub use traits::{
    CiphertextHandle, DecryptError, DecryptionAuthority, EncryptionBackend, FheError, InputProof,
};
