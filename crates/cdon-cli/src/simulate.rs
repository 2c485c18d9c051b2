//! # Simulate Subcommand
//!
//! Replays a scenario file against an in-memory registry over the mock
//! encryption backend and prints a JSON report: the outcome of every step,
//! the event log, the final round views and the host transfers.
//!
//! ```bash
//! cdon simulate scenarios/water.yaml --pretty
//! ```
//!
//! Exit code 0 when every step behaved as the scenario expects, 1 otherwise.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Args;
use serde::Serialize;

use cdon_core::{Amount, Principal, RoundId, Timestamp};
use cdon_fhe::{EncryptionBackend, MockBackend};
use cdon_rounds::{
    CallContext, EventRecord, InMemoryTransfer, NewRound, RoundRegistry, RoundView, UnlockOutcome,
};

use crate::scenario::{Action, DecryptTarget, Scenario, Step};

/// Arguments for the simulate subcommand.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Path to the scenario YAML file.
    pub scenario: PathBuf,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pub pretty: bool,
}

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// Zero-based step index.
    pub index: usize,
    /// Action name.
    pub action: &'static str,
    /// Host clock the step ran at.
    pub clock: Timestamp,
    /// Result detail on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the result matched the scenario's expectation.
    pub as_expected: bool,
}

/// A value transfer performed by a payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRecord {
    pub to: Principal,
    pub amount: Amount,
}

/// Full result of a simulation.
#[derive(Debug, Serialize)]
pub struct Report {
    pub steps: Vec<StepReport>,
    pub events: Vec<EventRecord>,
    pub rounds: Vec<RoundView>,
    pub transfers: Vec<TransferRecord>,
}

impl Report {
    /// Whether every step matched its expectation.
    pub fn all_as_expected(&self) -> bool {
        self.steps.iter().all(|s| s.as_expected)
    }
}

/// A registry, a clock and a transfer sink driven by scenario steps.
struct Simulation<'a> {
    scenario: &'a Scenario,
    registry: RoundRegistry<MockBackend>,
    clock: Timestamp,
    sink: InMemoryTransfer,
}

impl<'a> Simulation<'a> {
    fn new(scenario: &'a Scenario) -> Self {
        Self {
            scenario,
            registry: RoundRegistry::new(Arc::new(MockBackend::new()), scenario.config.clone()),
            clock: scenario.clock,
            sink: InMemoryTransfer::new(),
        }
    }

    fn ctx(&self, caller: &str) -> CallContext {
        CallContext::new(self.scenario.principal(caller), self.clock)
    }

    fn step(&mut self, index: usize, step: &Step) -> StepReport {
        let clock = self.clock;
        let result = self.apply(&step.action);
        let as_expected = match (&result, &step.expect_error) {
            (Ok(_), None) => true,
            (Ok(_), Some(_)) => false,
            (Err(_), None) => false,
            (Err(e), Some(want)) => format!("{e:#}").contains(want.as_str()),
        };
        if !as_expected {
            tracing::warn!(step = index, action = step.action.name(), "step did not behave as expected");
        }
        let (detail, error) = match result {
            Ok(detail) => (detail, None),
            Err(e) => (None, Some(format!("{e:#}"))),
        };
        StepReport {
            index,
            action: step.action.name(),
            clock,
            detail,
            error,
            as_expected,
        }
    }

    fn apply(&mut self, action: &Action) -> Result<Option<String>> {
        match action {
            Action::Create(c) => {
                let start_at = if c.starts_in < 0 {
                    self.clock.minus_secs(c.starts_in.unsigned_abs())
                } else {
                    self.clock.plus_secs(c.starts_in.unsigned_abs())
                };
                let params = NewRound {
                    id: RoundId::from_label(&c.round),
                    beneficiary: self.scenario.principal(&c.beneficiary),
                    goal: c.goal,
                    start_at,
                    end_at: start_at.plus_secs(c.duration),
                    policy: c.policy,
                    title: c.title.clone(),
                    description: c.description.clone(),
                };
                let ctx = self.ctx(&c.caller);
                let round = self.registry.create_round(&ctx, params)?;
                Ok(Some(round.id.to_hex()))
            }
            Action::Donate(d) => {
                let ctx = self.ctx(&d.caller).with_value(d.payment);
                let (handle, proof) = self.registry.backend().encrypt(d.pledge, &ctx.caller);
                self.registry
                    .donate(&ctx, &RoundId::from_label(&d.round), &handle, &proof)?;
                Ok(None)
            }
            Action::Unlock(u) => {
                let ctx = self.ctx(&u.caller);
                let outcome = self
                    .registry
                    .maybe_make_total_public(&ctx, &RoundId::from_label(&u.round))?;
                Ok(Some(
                    match outcome {
                        UnlockOutcome::Unlocked => "unlocked",
                        UnlockOutcome::AlreadyUnlocked => "already unlocked",
                    }
                    .to_string(),
                ))
            }
            Action::Payout(p) => {
                let ctx = self.ctx(&p.caller);
                let amount =
                    self.registry
                        .payout(&ctx, &RoundId::from_label(&p.round), &mut self.sink)?;
                Ok(Some(amount.to_string()))
            }
            Action::Decrypt(d) => {
                let id = RoundId::from_label(&d.round);
                let who = self.scenario.principal(&d.caller);
                let handle = match d.target {
                    DecryptTarget::Total => self.registry.get_total_handle(&id),
                    DecryptTarget::Mine => self.registry.get_my_total(&id, &who),
                };
                let value = self.registry.decrypt(&handle, &who)?;
                if let Some(want) = d.expect {
                    if value != want {
                        return Err(anyhow!("decrypted {value}, expected {want}"));
                    }
                }
                Ok(Some(value.to_string()))
            }
            Action::Advance(secs) => {
                self.clock = self.clock.plus_secs(*secs);
                Ok(None)
            }
        }
    }

    fn finish(self, steps: Vec<StepReport>) -> Report {
        Report {
            steps,
            events: self.registry.events().records().to_vec(),
            rounds: self.registry.rounds().iter().map(|r| r.view()).collect(),
            transfers: self
                .sink
                .log()
                .iter()
                .map(|(to, amount)| TransferRecord {
                    to: *to,
                    amount: *amount,
                })
                .collect(),
        }
    }
}

/// Run every step of `scenario` and collect the report.
pub fn run(scenario: &Scenario) -> Report {
    let mut sim = Simulation::new(scenario);
    let steps = scenario
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| sim.step(i, step))
        .collect();
    sim.finish(steps)
}

/// Execute the simulate subcommand.
pub fn run_simulate(args: &SimulateArgs) -> Result<u8> {
    let scenario = Scenario::load(&args.scenario)?;
    tracing::info!(
        scenario = %args.scenario.display(),
        steps = scenario.steps.len(),
        "running scenario"
    );
    let report = run(&scenario);
    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(if report.all_as_expected() { 0 } else { 1 })
}
