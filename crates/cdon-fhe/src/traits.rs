//! # Encryption Backend Trait
//!
//! Abstract interface for the homomorphic encryption scheme. Implementations
//! (the in-memory mock, or a bridge to a real coprocessor) must satisfy this
//! trait.
//!
//! ## Security Invariant
//!
//! Decryption is never unconditional. [`EncryptionBackend::decrypt()`] takes
//! a [`DecryptionAuthority`] and must refuse with [`DecryptError::Denied`]
//! when the authority says no, before looking at the ciphertext.
//!
//! The trait requires `Send + Sync` so one backend can be shared by the
//! registry and by client-side encryptors.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use cdon_core::{from_hex, to_hex, Principal};

/// Opaque reference to an encrypted 64-bit value held by the backend.
///
/// The all-zero handle is the null sentinel: "no ciphertext".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CiphertextHandle([u8; 32]);

impl CiphertextHandle {
    /// The null sentinel handle.
    pub const NULL: CiphertextHandle = CiphertextHandle([0u8; 32]);

    /// Wrap raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether this is the null sentinel.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Lowercase hex with `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", to_hex(&self.0))
    }
}

impl std::fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for CiphertextHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CiphertextHandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = from_hex(&s).map_err(serde::de::Error::custom)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("ciphertext handle must be 32 bytes"))?;
        Ok(Self(arr))
    }
}

/// Proof that a submitted ciphertext is well formed and bound to its
/// submitter. Opaque to the round engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputProof(Vec<u8>);

impl InputProof {
    /// Wrap proof bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Access the proof bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Error from a homomorphic operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FheError {
    /// The backend holds no ciphertext for this handle.
    #[error("unknown ciphertext handle {0}")]
    UnknownHandle(CiphertextHandle),

    /// Scheme-specific failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Error from a decryption request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecryptError {
    /// The authority refused this principal for this handle.
    #[error("principal {principal} may not decrypt {handle}")]
    Denied {
        /// The handle that was requested.
        handle: CiphertextHandle,
        /// The principal that asked.
        principal: Principal,
    },

    /// The null sentinel handle carries no value.
    #[error("null ciphertext handle")]
    NullHandle,

    /// The backend holds no ciphertext for this handle.
    #[error("unknown ciphertext handle {0}")]
    UnknownHandle(CiphertextHandle),
}

/// Answers "may this principal decrypt this handle?".
///
/// Must be a pure function of the authority's own state.
pub trait DecryptionAuthority {
    /// Whether `principal` is authorized to decrypt `handle`.
    fn may_decrypt(&self, handle: &CiphertextHandle, principal: &Principal) -> bool;
}

/// Abstract interface for a homomorphic encryption scheme over 64-bit
/// unsigned integers.
pub trait EncryptionBackend: Send + Sync {
    /// Client-side encryption of `value` for `submitter`, producing a fresh
    /// handle and an input proof bound to that submitter.
    fn encrypt(&self, value: u64, submitter: &Principal) -> (CiphertextHandle, InputProof);

    /// Encrypt a public constant (no proof, no submitter binding).
    fn trivial_encrypt(&self, value: u64) -> CiphertextHandle;

    /// Homomorphic addition, wrapping modulo 2^64. Returns a new handle;
    /// the operands are left untouched.
    fn add(
        &self,
        lhs: &CiphertextHandle,
        rhs: &CiphertextHandle,
    ) -> Result<CiphertextHandle, FheError>;

    /// Verify that `proof` attests `handle` was produced by `submitter`.
    fn verify_proof(
        &self,
        handle: &CiphertextHandle,
        proof: &InputProof,
        submitter: &Principal,
    ) -> bool;

    /// Decrypt `handle` for `principal` if `authority` allows it.
    fn decrypt(
        &self,
        handle: &CiphertextHandle,
        principal: &Principal,
        authority: &dyn DecryptionAuthority,
    ) -> Result<u64, DecryptError>;
}
