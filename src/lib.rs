//! hopwatch — unattended `mtr` runner.
//!
//! Probes a list of destinations on a fixed interval, normalizes whatever
//! report format the installed `mtr` produces into canonical JSON, and keeps
//! one timestamped file per probe run.
//!
//! # Architecture
//!
//! ```text
//! Config ──► Scheduler ──► Probe (mtr) ──► Normalizer ──► ResultStore
//!                ▲                                            │
//!                └──────────────── sleep(interval) ◄──────────┘
//! ```
//!
//! The pure pieces live in [`hopwatch_core`], the side-effecting ones in
//! [`hopwatch_runner`]. This crate only wires them together for the binary.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use hopwatch_core::{Config, Dialect, RawProbeOutput};
use hopwatch_runner::{MtrProbe, ResultStore, Scheduler};

/// Start the runner. With `once` a single cycle is run and the function
/// returns; otherwise it never returns.
///
/// Fails only if the output directory cannot be created.
pub async fn run(config: Config, once: bool) -> anyhow::Result<()> {
    let store = ResultStore::open(&config.output_path)
        .await
        .context("output directory is unusable")?;

    tracing::info!(
        interval_secs = config.interval.as_secs(),
        count = config.count.get(),
        output = %store.dir().display(),
        bin = %config.bin.display(),
        dialect = %config.dialect,
        targets = ?config.destinations,
        "starting"
    );

    let probe = MtrProbe::new().with_timeout(config.probe_timeout);
    let scheduler = Scheduler::new(config, probe, store);

    if once {
        scheduler.run_cycle().await;
    } else {
        scheduler.run().await;
    }
    Ok(())
}

/// Normalize a saved probe capture. The dialect is guessed from the contents
/// when not given.
pub fn normalize_capture(
    bytes: Vec<u8>,
    destination: &str,
    dialect: Option<Dialect>,
    now: DateTime<Utc>,
) -> anyhow::Result<String> {
    let dialect = dialect.unwrap_or_else(|| Dialect::sniff(&String::from_utf8_lossy(&bytes)));
    let raw = RawProbeOutput::new(dialect, bytes);
    let normalized = hopwatch_core::normalize_at(&raw, destination, now);
    if let Some(reason) = normalized.warning() {
        tracing::warn!(reason, "capture could not be normalized cleanly");
    }
    normalized.render().context("failed to encode capture")
}

/// Read `path` and normalize it with [`normalize_capture`].
pub fn normalize_file(
    path: &Path,
    destination: &str,
    dialect: Option<Dialect>,
) -> anyhow::Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    normalize_capture(bytes, destination, dialect, Utc::now())
}
