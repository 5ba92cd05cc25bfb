//! Scheduler — the unattended measurement loop.
//!
//! Each cycle walks the configured destinations in order, one at a time:
//!
//! ```text
//! Idle ─► Invoking(dest) ─► Normalizing ─► Persisting ─► Idle   (per destination)
//! Idle ─► Sleeping ─► Idle                                      (after the last one)
//! ```
//!
//! A destination whose probe fails is logged and skipped; nothing is written
//! for it and the cycle moves on. Output that cannot be parsed is still
//! written, in degraded form, so the capture can be inspected later. No error
//! from one destination reaches another.

use std::path::{Path, PathBuf};

use hopwatch_core::normalizer::normalize_at;
use hopwatch_core::{Config, ProbeRequest};

use crate::clock::{Clock, Sleeper, SystemClock, TokioSleeper};
use crate::probe::{Probe, ProbeError};
use crate::store::{ResultStore, StoreError};

/// What happened to one destination in one cycle.
#[derive(Debug)]
pub enum StepOutcome {
    /// A capture file was written. `degraded` marks error-marker and
    /// raw-fallback captures.
    Persisted { path: PathBuf, degraded: bool },
    /// The probe could not be run; nothing was written.
    ProbeFailed(ProbeError),
    /// The probe ran but its capture could not be written.
    WriteFailed(StoreError),
}

impl StepOutcome {
    pub fn is_persisted(&self) -> bool {
        matches!(self, StepOutcome::Persisted { .. })
    }
}

/// Per-destination outcomes of one cycle, in the order they ran.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub steps: Vec<(String, StepOutcome)>,
}

impl CycleReport {
    /// Paths written this cycle.
    pub fn written(&self) -> Vec<&Path> {
        self.steps
            .iter()
            .filter_map(|(_, outcome)| match outcome {
                StepOutcome::Persisted { path, .. } => Some(path.as_path()),
                _ => None,
            })
            .collect()
    }

    /// Destinations that produced no file this cycle.
    pub fn failed(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|(_, outcome)| !outcome.is_persisted())
            .map(|(dest, _)| dest.as_str())
            .collect()
    }

    pub fn degraded(&self) -> usize {
        self.steps
            .iter()
            .filter(|(_, outcome)| matches!(outcome, StepOutcome::Persisted { degraded: true, .. }))
            .count()
    }
}

/// Drives probe → normalize → persist over every destination, forever.
pub struct Scheduler<P, C = SystemClock, S = TokioSleeper> {
    config: Config,
    probe: P,
    store: ResultStore,
    clock: C,
    sleeper: S,
}

impl<P: Probe> Scheduler<P> {
    /// A scheduler on the wall clock and the tokio timer.
    pub fn new(config: Config, probe: P, store: ResultStore) -> Self {
        Self {
            config,
            probe,
            store,
            clock: SystemClock,
            sleeper: TokioSleeper,
        }
    }
}

impl<P, C, S> Scheduler<P, C, S>
where
    P: Probe,
    C: Clock,
    S: Sleeper,
{
    pub fn with_clock<C2: Clock>(self, clock: C2) -> Scheduler<P, C2, S> {
        Scheduler {
            config: self.config,
            probe: self.probe,
            store: self.store,
            clock,
            sleeper: self.sleeper,
        }
    }

    pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> Scheduler<P, C, S2> {
        Scheduler {
            config: self.config,
            probe: self.probe,
            store: self.store,
            clock: self.clock,
            sleeper,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Run cycles until the process is terminated.
    pub async fn run(&self) {
        loop {
            self.run_cycle().await;
            self.sleep_between_cycles().await;
        }
    }

    /// Run exactly `cycles` cycles, sleeping between them but not after the
    /// last one.
    pub async fn run_cycles(&self, cycles: usize) -> Vec<CycleReport> {
        let mut reports = Vec::with_capacity(cycles);
        for n in 0..cycles {
            if n > 0 {
                self.sleep_between_cycles().await;
            }
            reports.push(self.run_cycle().await);
        }
        reports
    }

    /// One pass over every configured destination, strictly in order.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();
        for destination in &self.config.destinations {
            let outcome = self.run_destination(destination).await;
            report.steps.push((destination.clone(), outcome));
        }

        tracing::info!(
            written = report.written().len(),
            degraded = report.degraded(),
            failed = report.failed().len(),
            "cycle complete"
        );
        report
    }

    /// Probe, normalize and persist a single destination.
    pub async fn run_destination(&self, destination: &str) -> StepOutcome {
        let captured_at = self.clock.now();
        let request = ProbeRequest::new(
            self.config.bin.clone(),
            destination,
            self.config.count,
            self.config.dialect,
        );
        tracing::info!(
            destination,
            path = %self.store.path_for(&captured_at, destination).display(),
            "running probe"
        );

        let raw = match self.probe.invoke(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(destination, error = %e, "probe failed; skipping until next cycle");
                return StepOutcome::ProbeFailed(e);
            }
        };

        let normalized = normalize_at(&raw, destination, captured_at);
        if let Some(reason) = normalized.warning() {
            tracing::warn!(destination, reason, "probe output could not be normalized; keeping degraded capture");
        }

        match self.store.write(&captured_at, destination, &normalized).await {
            Ok(path) => {
                tracing::debug!(destination, path = %path.display(), "capture written");
                StepOutcome::Persisted {
                    path,
                    degraded: normalized.is_degraded(),
                }
            }
            Err(e) => {
                tracing::error!(destination, error = %e, "failed to persist capture");
                StepOutcome::WriteFailed(e)
            }
        }
    }

    async fn sleep_between_cycles(&self) {
        tracing::info!(interval_secs = self.config.interval.as_secs(), "sleeping until next cycle");
        self.sleeper.sleep(self.config.interval).await;
    }
}
