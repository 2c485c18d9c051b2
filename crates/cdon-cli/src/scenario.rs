//! # Scenario Files
//!
//! A scenario is a YAML document describing a scripted sequence of calls
//! against a fresh registry:
//!
//! ```yaml
//! config:
//!   max_title_len: 64
//! clock: 1700000000
//! principals:
//!   treasury: "0x00000000000000000000000000000000000000aa"
//! steps:
//!   - create: { round: water, as: owner, beneficiary: treasury, goal: 8,
//!               starts_in: -5, duration: 3600, policy: after_end }
//!   - donate: { round: water, as: alice, pledge: 3, payment: 3 }
//!   - unlock: { round: water, as: alice }
//!     expect_error: "policy: after end"
//!   - advance: 3601
//!   - decrypt: { round: water, as: bob, target: total, expect: 3 }
//! ```
//!
//! Names not listed under `principals` map to a principal derived from the
//! name itself. Round names are labels hashed into round ids.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use cdon_core::{Amount, Principal, Timestamp};
use cdon_rounds::{DisclosurePolicy, RegistryConfig};

const DEFAULT_CLOCK: u64 = 1_700_000_000;

fn default_clock() -> Timestamp {
    Timestamp::from_epoch_secs(DEFAULT_CLOCK)
}

/// A scripted run.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Registry configuration.
    #[serde(default)]
    pub config: RegistryConfig,
    /// Initial host clock.
    #[serde(default = "default_clock")]
    pub clock: Timestamp,
    /// Explicit principal addresses by name.
    #[serde(default)]
    pub principals: BTreeMap<String, Principal>,
    /// Steps in execution order.
    pub steps: Vec<Step>,
}

/// One scripted call and what it is expected to do.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// The call.
    #[serde(flatten)]
    pub action: Action,
    /// If set, the step must fail with a message containing this text.
    #[serde(default)]
    pub expect_error: Option<String>,
}

/// A registry call or a clock change.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create(CreateStep),
    Donate(DonateStep),
    Unlock(RoundStep),
    Payout(RoundStep),
    Decrypt(DecryptStep),
    /// Move the clock forward by this many seconds.
    Advance(u64),
}

impl Action {
    /// Short action name for reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Donate(_) => "donate",
            Self::Unlock(_) => "unlock",
            Self::Payout(_) => "payout",
            Self::Decrypt(_) => "decrypt",
            Self::Advance(_) => "advance",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStep {
    pub round: String,
    #[serde(rename = "as")]
    pub caller: String,
    pub beneficiary: String,
    #[serde(default)]
    pub goal: u64,
    /// Seconds from the current clock to `start_at`; may be negative.
    #[serde(default)]
    pub starts_in: i64,
    /// Seconds from `start_at` to `end_at`.
    pub duration: u64,
    pub policy: DisclosurePolicy,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DonateStep {
    pub round: String,
    #[serde(rename = "as")]
    pub caller: String,
    /// Plaintext value encrypted client-side as the pledge.
    pub pledge: u64,
    /// Native currency attached to the call.
    #[serde(default)]
    pub payment: Amount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoundStep {
    pub round: String,
    #[serde(rename = "as")]
    pub caller: String,
}

/// Which handle a decrypt step reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecryptTarget {
    /// The round aggregate.
    Total,
    /// The caller's own subtotal.
    Mine,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecryptStep {
    pub round: String,
    #[serde(rename = "as")]
    pub caller: String,
    pub target: DecryptTarget,
    /// Expected plaintext, if the step should check it.
    #[serde(default)]
    pub expect: Option<u64>,
}

impl Scenario {
    /// Parse a scenario from YAML text.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("invalid scenario")
    }

    /// Load a scenario file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Resolve a principal name.
    pub fn principal(&self, name: &str) -> Principal {
        self.principals
            .get(name)
            .copied()
            .unwrap_or_else(|| Principal::from_name(name))
    }
}
