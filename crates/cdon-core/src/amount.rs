//! # Native-Currency Amounts
//!
//! `Amount` is a plaintext quantity of the host ledger's native currency in
//! its smallest unit. Escrow balances, attached payments and payouts are all
//! `Amount`s; encrypted pledges are not.
//!
//! Amounts serialize as decimal strings because JSON consumers cannot hold
//! 128-bit integers losslessly. Deserialization accepts either a decimal
//! string or a plain integer that fits in `u64`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// A non-negative native-currency quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u128);

impl Amount {
    /// Zero.
    pub const ZERO: Amount = Amount(0);

    /// Wrap a raw unit count.
    pub const fn new(units: u128) -> Self {
        Self(units)
    }

    /// The raw unit count.
    pub const fn units(&self) -> u128 {
        self.0
    }

    /// Whether the amount is zero.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Addition that fails instead of wrapping.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Parse a decimal unit count.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        s.trim()
            .parse::<u128>()
            .map(Amount)
            .map_err(|_| CoreError::InvalidAmount(s.to_string()))
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(units: u64) -> Self {
        Self(u128::from(units))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(u64),
            Str(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Int(n) => Ok(Amount::from(n)),
            Repr::Str(s) => Amount::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// checked_add agrees with u128::checked_add.
        #[test]
        fn checked_add_matches_u128(a in any::<u128>(), b in any::<u128>()) {
            let expected = a.checked_add(b).map(Amount::new);
            prop_assert_eq!(Amount::new(a).checked_add(Amount::new(b)), expected);
        }
    }
}
