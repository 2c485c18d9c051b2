//! # Temporal Types — Host Epoch Timestamps
//!
//! Defines `Timestamp`, whole seconds since the Unix epoch as supplied by the
//! host ledger. Round windows (`start_at`, `end_at`) and the per-call clock
//! reading are all `Timestamp`s.
//!
//! The host clock is authoritative for exactly one operation: every
//! mutation samples it once through its call context and never re-reads it.
//!
//! ISO8601 rendering (`YYYY-MM-DDTHH:MM:SSZ`) exists for logs and CLI output
//! only. Comparisons never go through calendar types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Unsigned seconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Wrap an epoch-seconds value.
    pub const fn from_epoch_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Seconds since the epoch.
    pub const fn epoch_secs(&self) -> u64 {
        self.0
    }

    /// This timestamp moved forward by `secs`, saturating at `u64::MAX`.
    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// This timestamp moved backward by `secs`, saturating at the epoch.
    pub fn minus_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_sub(secs))
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> Result<String, CoreError> {
        let secs = i64::try_from(self.0).map_err(|_| CoreError::TimestampOutOfRange(self.0))?;
        let dt: DateTime<Utc> =
            DateTime::from_timestamp(secs, 0).ok_or(CoreError::TimestampOutOfRange(self.0))?;
        Ok(dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_iso8601() {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "@{}", self.0),
        }
    }
}

impl From<u64> for Timestamp {
    fn from(secs: u64) -> Self {
        Self(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso8601_format() {
        // 2026-01-15T12:00:00Z
        let ts = Timestamp::from_epoch_secs(1_768_478_400);
        assert_eq!(ts.to_iso8601().unwrap(), "2026-01-15T12:00:00Z");
        assert_eq!(ts.to_string(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn test_epoch_is_zero() {
        assert_eq!(Timestamp::default().to_iso8601().unwrap(), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_out_of_range_display_falls_back() {
        let ts = Timestamp::from_epoch_secs(u64::MAX);
        assert!(ts.to_iso8601().is_err());
        assert_eq!(ts.to_string(), format!("@{}", u64::MAX));
    }

    #[test]
    fn test_saturating_arithmetic() {
        assert_eq!(Timestamp::from_epoch_secs(3).minus_secs(5).epoch_secs(), 0);
        assert_eq!(
            Timestamp::from_epoch_secs(u64::MAX).plus_secs(1).epoch_secs(),
            u64::MAX
        );
    }

    #[test]
    fn test_ordering() {
        let earlier = Timestamp::from_epoch_secs(100);
        let later = earlier.plus_secs(1);
        assert!(earlier < later);
    }

    #[test]
    fn test_serde_is_plain_integer() {
        let ts = Timestamp::from_epoch_secs(42);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "42");
        let back: Timestamp = serde_json::from_str("42").unwrap();
        assert_eq!(back, ts);
    }
}
