//! Normalizer — turns raw probe output into the canonical persisted form.
//!
//! Two dialects are supported, chosen by how the probe was invoked:
//!
//! - **Legacy** (`mtr -r`): a header line naming at least
//!   [`MIN_HEADER_FIELDS`] columns, then one whitespace-delimited row per hop.
//!   Rows are re-keyed by header name into a [`CanonicalRecord`]. Values are
//!   never coerced, so the probe's own precision survives verbatim.
//! - **Structured** (`mtr -j`): already JSON. It is validated and
//!   pretty-printed but not reshaped. Text that does not parse is kept as-is
//!   so the capture is not lost.
//!
//! Nothing here panics on bad input. Degenerate legacy output becomes an
//! error marker (`{"error": "..."}`), unparseable structured output becomes
//! [`Normalized::Unparsed`].

use chrono::{DateTime, Utc};

use crate::types::{CanonicalRecord, CanonicalResult, Dialect, HopRecord, RawProbeOutput};

/// A legacy header with fewer columns than this is not a report.
pub const MIN_HEADER_FIELDS: usize = 8;

/// Why legacy output could not be turned into a [`CanonicalRecord`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LegacyFormatError {
    #[error("no output")]
    NoOutput,
    #[error("invalid output format: header has {found} fields, expected at least {expected}")]
    InvalidHeader { found: usize, expected: usize },
}

/// Result of normalizing one probe run, ready to be written out.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Legacy(CanonicalResult),
    Structured(serde_json::Value),
    /// Structured-dialect output that is not valid JSON, kept verbatim.
    Unparsed { raw: String, reason: String },
}

impl Normalized {
    /// File contents for this result. Unparsed output is returned unchanged.
    pub fn render(&self) -> serde_json::Result<String> {
        match self {
            Normalized::Legacy(result) => serde_json::to_string_pretty(result),
            Normalized::Structured(value) => serde_json::to_string_pretty(value),
            Normalized::Unparsed { raw, .. } => Ok(raw.clone()),
        }
    }

    /// True for the error-marker and raw-fallback forms.
    pub fn is_degraded(&self) -> bool {
        match self {
            Normalized::Legacy(result) => result.is_error(),
            Normalized::Structured(_) => false,
            Normalized::Unparsed { .. } => true,
        }
    }

    /// Human-readable reason the output was degraded, if it was.
    pub fn warning(&self) -> Option<&str> {
        match self {
            Normalized::Legacy(CanonicalResult::Error { error }) => Some(error),
            Normalized::Unparsed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Normalize `raw` using the current time as the record timestamp.
pub fn normalize(raw: &RawProbeOutput, destination: &str) -> Normalized {
    normalize_at(raw, destination, Utc::now())
}

/// Normalize `raw`, stamping legacy records with `now`.
///
/// `destination` is what was asked of the probe. A legacy record names the
/// destination its report repeats, which may be a different spelling.
pub fn normalize_at(raw: &RawProbeOutput, destination: &str, now: DateTime<Utc>) -> Normalized {
    let text = raw.text();
    match raw.dialect {
        Dialect::Legacy => match parse_legacy(&text, now) {
            Ok(record) => {
                if record.destination != destination {
                    tracing::debug!(
                        requested = destination,
                        reported = %record.destination,
                        "report names a different destination"
                    );
                }
                Normalized::Legacy(CanonicalResult::Record(record))
            }
            Err(e) => Normalized::Legacy(CanonicalResult::error(e.to_string())),
        },
        Dialect::Structured => match parse_structured(&text) {
            Ok(value) => Normalized::Structured(value),
            Err(e) => Normalized::Unparsed {
                raw: text.into_owned(),
                reason: format!("output was not valid JSON: {e}"),
            },
        },
    }
}

/// Parse a legacy tabular report.
///
/// The record's `destination` is the first token of the last line, which is
/// where the report repeats its target. It is a convenience field only: it
/// may be the numeric form of a hostname that was requested. With no rows
/// the header is the last line.
pub fn parse_legacy(
    text: &str,
    now: DateTime<Utc>,
) -> Result<CanonicalRecord, LegacyFormatError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(LegacyFormatError::NoOutput);
    }

    let mut lines = text.lines();
    let header: Vec<&str> = lines
        .next()
        .map(|line| line.split_whitespace().collect())
        .unwrap_or_default();
    if header.len() < MIN_HEADER_FIELDS {
        return Err(LegacyFormatError::InvalidHeader {
            found: header.len(),
            expected: MIN_HEADER_FIELDS,
        });
    }

    let mut destination = header[0];
    let mut hops = Vec::new();
    for (lineno, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if let Some(first) = fields.first() {
            destination = *first;
        }
        if fields.len() < header.len() {
            tracing::debug!(
                line = lineno + 2,
                fields = fields.len(),
                expected = header.len(),
                "dropping short report row"
            );
            continue;
        }
        let hop: HopRecord = header
            .iter()
            .zip(fields)
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        hops.push(hop);
    }

    Ok(CanonicalRecord {
        destination: destination.to_string(),
        timestamp: now,
        hops,
    })
}

/// Parse native structured output into a generic JSON value.
pub fn parse_structured(text: &str) -> serde_json::Result<serde_json::Value> {
    serde_json::from_str(text.trim())
}
