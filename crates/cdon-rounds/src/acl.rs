//! # Decryption Access Control List
//!
//! Decryption rights live in a side-table, separate from ciphertext storage
//! and from the round records. The table maps a ciphertext handle to the set
//! of principals holding a positive grant, plus a set of handles that anyone
//! may read.
//!
//! ## Rules enforced by the registry
//!
//! - A donor holds a standing grant on every subtotal handle produced for
//!   them, from their first successful donation onward.
//! - A round's aggregate handle is granted to the round owner only.
//! - Once a round's total is unlocked, its aggregate handle is public.
//!
//! ## Security Invariant
//!
//! Grants only accumulate. There is no revoke operation, and the null
//! handle can never be granted.

use std::collections::{BTreeSet, HashMap, HashSet};

use cdon_core::Principal;
use cdon_fhe::{CiphertextHandle, DecryptionAuthority};

/// Handle → grantees side-table with a public (wildcard) set.
#[derive(Debug, Default, Clone)]
pub struct AccessControlList {
    grants: HashMap<CiphertextHandle, BTreeSet<Principal>>,
    public: HashSet<CiphertextHandle>,
}

impl AccessControlList {
    /// Create an empty ACL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `principal` decryption rights on `handle`.
    ///
    /// Returns `true` if the grant is new. Grants on the null handle are
    /// ignored and return `false`.
    pub fn grant(&mut self, handle: CiphertextHandle, principal: Principal) -> bool {
        if handle.is_null() {
            return false;
        }
        self.grants.entry(handle).or_default().insert(principal)
    }

    /// Make `handle` readable by every principal, permanently.
    ///
    /// Returns `true` if the handle was not already public.
    pub fn grant_public(&mut self, handle: CiphertextHandle) -> bool {
        if handle.is_null() {
            return false;
        }
        self.public.insert(handle)
    }

    /// Whether `handle` carries the wildcard grant.
    pub fn is_public(&self, handle: &CiphertextHandle) -> bool {
        self.public.contains(handle)
    }

    /// Whether `principal` may decrypt `handle`.
    pub fn may_decrypt(&self, handle: &CiphertextHandle, principal: &Principal) -> bool {
        if handle.is_null() {
            return false;
        }
        self.public.contains(handle)
            || self
                .grants
                .get(handle)
                .is_some_and(|grantees| grantees.contains(principal))
    }

    /// Principals holding an explicit grant on `handle`, in sorted order.
    pub fn grantees(&self, handle: &CiphertextHandle) -> impl Iterator<Item = &Principal> + '_ {
        self.grants.get(handle).into_iter().flatten()
    }

    /// Total number of explicit (handle, principal) grants.
    pub fn grant_count(&self) -> usize {
        self.grants.values().map(BTreeSet::len).sum()
    }
}

impl DecryptionAuthority for AccessControlList {
    fn may_decrypt(&self, handle: &CiphertextHandle, principal: &Principal) -> bool {
        AccessControlList::may_decrypt(self, handle, principal)
    }
}
