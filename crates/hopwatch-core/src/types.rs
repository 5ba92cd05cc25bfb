//! Core types for hopwatch-core.
//!
//! This module defines the data structures shared by the normalizer and the
//! runner: the per-invocation [`ProbeRequest`], the dialect-tagged
//! [`RawProbeOutput`], and the persisted [`CanonicalResult`] with its
//! [`HopRecord`] rows.

use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// One row of per-hop measurements, keyed by the probe's own header names.
///
/// Values are kept exactly as the probe printed them. Keys serialize in
/// sorted order.
pub type HopRecord = BTreeMap<String, String>;

/// Which output format the probe was asked to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `mtr -r`: a header line followed by whitespace-delimited rows.
    Legacy,
    /// `mtr -j`: the probe's native JSON report.
    Structured,
}

impl Dialect {
    /// Guess the dialect of a saved capture. Anything that opens like a JSON
    /// document is treated as structured.
    pub fn sniff(text: &str) -> Self {
        match text.trim_start().chars().next() {
            Some('{') | Some('[') => Dialect::Structured,
            _ => Dialect::Legacy,
        }
    }

    /// Probe flag selecting this dialect's report mode.
    pub fn mode_flag(self) -> &'static str {
        match self {
            Dialect::Legacy => "-r",
            Dialect::Structured => "-j",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::Legacy => write!(f, "legacy"),
            Dialect::Structured => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" | "report" | "tabular" => Ok(Dialect::Legacy),
            "json" | "structured" => Ok(Dialect::Structured),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}

/// Returned when a dialect name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown probe dialect {0:?} (expected \"legacy\" or \"json\")")]
pub struct UnknownDialect(pub String);

/// Everything needed to launch one probe run against one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub destination: String,
    pub count: NonZeroU32,
    pub binary: PathBuf,
    pub dialect: Dialect,
}

impl ProbeRequest {
    pub fn new(
        binary: impl Into<PathBuf>,
        destination: impl Into<String>,
        count: NonZeroU32,
        dialect: Dialect,
    ) -> Self {
        Self {
            destination: destination.into(),
            count,
            binary: binary.into(),
            dialect,
        }
    }

    /// Command-line arguments for the probe: report mode, fixed packet count,
    /// numeric hosts only, then the destination.
    pub fn args(&self) -> Vec<String> {
        vec![
            self.dialect.mode_flag().to_string(),
            "-c".to_string(),
            self.count.to_string(),
            "-n".to_string(),
            self.destination.clone(),
        ]
    }
}

/// Captured standard output of a successful probe run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProbeOutput {
    pub dialect: Dialect,
    pub bytes: Vec<u8>,
}

impl RawProbeOutput {
    pub fn new(dialect: Dialect, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            dialect,
            bytes: bytes.into(),
        }
    }

    /// Output decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// A successfully normalized legacy report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalRecord {
    /// Best-effort destination taken from the report itself.
    pub destination: String,
    /// When the report was normalized. Legacy output carries no timestamp.
    #[serde(serialize_with = "serialize_rfc3339")]
    pub timestamp: DateTime<Utc>,
    pub hops: Vec<HopRecord>,
}

/// The persisted unit for legacy output: a record, or an error marker when
/// the output could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CanonicalResult {
    Record(CanonicalRecord),
    Error { error: String },
}

impl CanonicalResult {
    pub fn error(message: impl Into<String>) -> Self {
        CanonicalResult::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CanonicalResult::Error { .. })
    }
}

/// RFC 3339 in UTC at second precision, e.g. `2024-01-15T10:00:00Z`.
pub fn format_rfc3339(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn serialize_rfc3339<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_rfc3339(ts))
}
