//! # Identity Newtypes
//!
//! Newtype wrappers for the two identifier namespaces of the system. You
//! cannot pass a [`RoundId`] where a [`Principal`] is expected.
//!
//! Both serialize as `0x`-prefixed lowercase hex strings so that scenario
//! files and event logs stay human-readable.
//!
//! ## Round ids
//!
//! A round id is an opaque 32-byte key. By convention it is derived from a
//! human-chosen label with [`RoundId::from_label()`]; collisions between
//! distinct labels are assumed negligible. Ids are never reused.
//!
//! ## Principals
//!
//! A principal is a 20-byte account identifier supplied by the host ledger.
//! The all-zero value is the null principal and is never a valid
//! beneficiary.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::digest::{from_hex, sha256, to_hex};
use crate::error::CoreError;

/// Opaque 32-byte identifier of a donation round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoundId([u8; 32]);

impl RoundId {
    /// Wrap raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive a round id from a label: `SHA-256(utf8(label))`.
    pub fn from_label(label: &str) -> Self {
        Self(sha256(label.as_bytes()))
    }

    /// Parse a 64-digit hex string, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = from_hex(s)?;
        let actual = bytes.len();
        let arr: [u8; 32] = bytes.try_into().map_err(|_| CoreError::InvalidLength {
            kind: "round id",
            expected: 32,
            actual,
        })?;
        Ok(Self(arr))
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex with `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", to_hex(&self.0))
    }
}

impl std::fmt::Display for RoundId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for RoundId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RoundId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A 20-byte account identifier on the host ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Principal([u8; 20]);

impl Principal {
    /// The null principal (all zero bytes).
    pub const NULL: Principal = Principal([0u8; 20]);

    /// Wrap raw bytes.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Deterministically derive a principal from a name: the first 20 bytes
    /// of `SHA-256(utf8(name))`. Used for fixtures and scenario files.
    pub fn from_name(name: &str) -> Self {
        let digest = sha256(name.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        Self(bytes)
    }

    /// Parse a 40-digit hex string, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = from_hex(s)?;
        let actual = bytes.len();
        let arr: [u8; 20] = bytes.try_into().map_err(|_| CoreError::InvalidLength {
            kind: "principal",
            expected: 20,
            actual,
        })?;
        Ok(Self(arr))
    }

    /// Whether this is the null principal.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase hex with `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", to_hex(&self.0))
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
