use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;

use anyhow::Context;
use colored::Colorize;
use lineage_crypto::{EventVerifier, VerifyingKey};
use lineage_producer::{Producer, SignatureMode};
use lineage_store::{FileStore, LineageStore};
use lineage_trust::{TrustController, TrustState};
use lineage_types::{Event, SourceId};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::config::LineageConfig;

pub const HONEST_SOURCE: &str = "honest_core";
pub const ATTACKER_SOURCE: &str = "attacker";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Bootstrap,
    Attack,
    Reload,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Bootstrap => "BOOTSTRAP",
            Self::Attack => "ATTACK",
            Self::Reload => "RELOAD",
        };
        f.pad(s)
    }
}

/// One verified event and the trust state it produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Verification {
    pub phase: Phase,
    pub source: SourceId,
    pub index: u64,
    pub valid: bool,
    pub state: TrustState,
}

#[derive(Debug, Serialize)]
pub struct DemoReport {
    pub verifications: Vec<Verification>,
    pub live_summary: BTreeMap<SourceId, TrustState>,
    pub reloaded_summary: BTreeMap<SourceId, TrustState>,
}

struct Session<'a> {
    out: &'a mut dyn Write,
    format: OutputFormat,
    verifier: EventVerifier,
    verifications: Vec<Verification>,
}

impl Session<'_> {
    fn heading(&mut self, title: &str) -> anyhow::Result<()> {
        if self.format == OutputFormat::Text {
            writeln!(self.out, "\n{}", format!("=== {title} ===").bold())?;
        }
        Ok(())
    }

    fn verify(
        &mut self,
        phase: Phase,
        event: &Event,
        key: &VerifyingKey,
        controller: &mut TrustController,
    ) -> anyhow::Result<bool> {
        let valid = self.verifier.verify(event, key);
        let state = controller.update(&event.source_id, valid);

        if self.format == OutputFormat::Text {
            let verdict = if valid {
                "GOOD".green()
            } else {
                "BAD ".red().bold()
            };
            writeln!(
                self.out,
                "[{phase:<9}] model={:<12} idx={:03} {verdict} {state}",
                event.source_id.as_str(),
                event.index,
            )?;
        }

        self.verifications.push(Verification {
            phase,
            source: event.source_id.clone(),
            index: event.index,
            valid,
            state,
        });
        Ok(valid)
    }

    fn summary(&mut self, controller: &TrustController) -> anyhow::Result<()> {
        if self.format == OutputFormat::Text {
            for (source, state) in controller.summary() {
                writeln!(
                    self.out,
                    "  {:<12} weight={:>4} theta={:>3}  ({state})",
                    source.as_str(),
                    state.weight,
                    state.theta
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full demonstration against the configured store.
///
/// Phases run in order: bootstrap (both sources valid), misbehavior (the
/// attacker forges every other event), summary, restart (fresh store and
/// fresh controller over the persisted log), re-verification, final summary.
pub fn run(
    config: &LineageConfig,
    append: bool,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<DemoReport> {
    let path = config.store_path.as_path();
    if !append && path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("clearing previous store {}", path.display()))?;
    }

    let mut session = Session {
        out,
        format,
        verifier: EventVerifier::new(config.verify_mode.into()),
        verifications: Vec::new(),
    };

    let mut honest = Producer::new(SourceId::new(HONEST_SOURCE)?);
    let mut attacker = Producer::new(SourceId::new(ATTACKER_SOURCE)?);
    let honest_key = honest.verifying_key();
    let attacker_key = attacker.verifying_key();

    let live_summary = {
        let store = FileStore::open(path, config.store_config())
            .with_context(|| format!("opening store {}", path.display()))?;
        honest.resume(&store)?;
        attacker.resume(&store)?;
        let mut controller = TrustController::new();

        session.heading("PHASE 1: BOOTSTRAP")?;
        for i in 0..config.bootstrap_rounds {
            let e = honest.emit(&store, format!("bootstrap_honest_{i}"), SignatureMode::Canonical)?;
            session.verify(Phase::Bootstrap, &e, &honest_key, &mut controller)?;

            let e = attacker.emit(&store, format!("bootstrap_attack_{i}"), SignatureMode::Canonical)?;
            session.verify(Phase::Bootstrap, &e, &attacker_key, &mut controller)?;
        }

        session.heading("PHASE 2: ATTACKER MISBEHAVES")?;
        for i in 0..config.misbehavior_rounds {
            let e = honest.emit(&store, format!("honest_phase2_{i}"), SignatureMode::Canonical)?;
            session.verify(Phase::Attack, &e, &honest_key, &mut controller)?;

            let mode = if i % 2 == 0 {
                SignatureMode::Corrupted
            } else {
                SignatureMode::Canonical
            };
            let e = attacker.emit(&store, format!("malicious_{i}"), mode)?;
            session.verify(Phase::Attack, &e, &attacker_key, &mut controller)?;
        }

        session.heading("SUMMARY AFTER PHASE 2")?;
        session.summary(&controller)?;
        controller.summary().clone()
    };

    // Only the event log survives the restart; trust state starts over.
    session.heading("RELOAD + REVERIFY")?;
    let store = FileStore::open(path, config.store_config())
        .with_context(|| format!("reopening store {}", path.display()))?;
    let mut controller = TrustController::new();
    for (source, key) in [
        (honest.source_id(), &honest_key),
        (attacker.source_id(), &attacker_key),
    ] {
        for event in store.read_chain(source)? {
            session.verify(Phase::Reload, &event, key, &mut controller)?;
        }
    }

    session.heading("SUMMARY AFTER RELOAD")?;
    session.summary(&controller)?;

    let report = DemoReport {
        verifications: session.verifications,
        live_summary,
        reloaded_summary: controller.summary().clone(),
    };

    match format {
        OutputFormat::Text => writeln!(session.out, "\n(events in {})", path.display())?,
        OutputFormat::Json => writeln!(session.out, "{}", serde_json::to_string_pretty(&report)?)?,
    }
    Ok(report)
}
