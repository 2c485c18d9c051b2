//! # Mock Encryption Backend
//!
//! A deterministic, transparent backend for tests and local simulation.
//! Plaintexts live in a table keyed by handle; handles are SHA-256 digests
//! of an allocation counter, and input proofs are SHA-256 digests binding a
//! handle to its submitter.
//!
//! ## Security Notice
//!
//! This implementation provides NO confidentiality. Anyone holding the
//! backend can read the table. It exists so that the round engine can be
//! exercised against the same arithmetic a real scheme performs, and so the
//! authority check in `decrypt()` is enforced exactly as a real backend
//! would enforce it.

use std::collections::HashMap;

use parking_lot::Mutex;

use cdon_core::{sha256_concat, Principal};

use crate::traits::{
    CiphertextHandle, DecryptError, DecryptionAuthority, EncryptionBackend, FheError, InputProof,
};

const HANDLE_DOMAIN: &[u8] = b"cdon/mock/handle";
const PROOF_DOMAIN: &[u8] = b"cdon/mock/input-proof";

#[derive(Debug, Default)]
struct MockState {
    values: HashMap<CiphertextHandle, u64>,
    next: u64,
}

impl MockState {
    fn allocate(&mut self, value: u64) -> CiphertextHandle {
        self.next += 1;
        let handle =
            CiphertextHandle::from_bytes(sha256_concat(&[HANDLE_DOMAIN, &self.next.to_be_bytes()]));
        self.values.insert(handle, value);
        handle
    }
}

/// In-memory backend performing plaintext arithmetic behind opaque handles.
#[derive(Debug, Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ciphertexts allocated so far.
    pub fn ciphertext_count(&self) -> usize {
        self.state.lock().values.len()
    }

    fn proof_for(handle: &CiphertextHandle, submitter: &Principal) -> InputProof {
        InputProof::new(
            sha256_concat(&[PROOF_DOMAIN, handle.as_bytes(), submitter.as_bytes()]).to_vec(),
        )
    }
}

impl EncryptionBackend for MockBackend {
    fn encrypt(&self, value: u64, submitter: &Principal) -> (CiphertextHandle, InputProof) {
        let handle = self.state.lock().allocate(value);
        (handle, Self::proof_for(&handle, submitter))
    }

    fn trivial_encrypt(&self, value: u64) -> CiphertextHandle {
        self.state.lock().allocate(value)
    }

    fn add(
        &self,
        lhs: &CiphertextHandle,
        rhs: &CiphertextHandle,
    ) -> Result<CiphertextHandle, FheError> {
        let mut state = self.state.lock();
        let a = *state.values.get(lhs).ok_or(FheError::UnknownHandle(*lhs))?;
        let b = *state.values.get(rhs).ok_or(FheError::UnknownHandle(*rhs))?;
        Ok(state.allocate(a.wrapping_add(b)))
    }

    fn verify_proof(
        &self,
        handle: &CiphertextHandle,
        proof: &InputProof,
        submitter: &Principal,
    ) -> bool {
        if !self.state.lock().values.contains_key(handle) {
            return false;
        }
        Self::proof_for(handle, submitter) == *proof
    }

    fn decrypt(
        &self,
        handle: &CiphertextHandle,
        principal: &Principal,
        authority: &dyn DecryptionAuthority,
    ) -> Result<u64, DecryptError> {
        if handle.is_null() {
            return Err(DecryptError::NullHandle);
        }
        if !authority.may_decrypt(handle, principal) {
            return Err(DecryptError::Denied {
                handle: *handle,
                principal: *principal,
            });
        }
        self.state
            .lock()
            .values
            .get(handle)
            .copied()
            .ok_or(DecryptError::UnknownHandle(*handle))
    }
}
