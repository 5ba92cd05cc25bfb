//! hopwatch-core — shared types and the probe-output normalizer.
//!
//! # Architecture
//!
//! ```text
//! Scheduler ──► Probe ──► Normalizer ──► Store
//!     ▲                                    │
//!     └────────────── sleep ◄──────────────┘
//! ```
//!
//! This crate holds the pure half of the pipeline: the [`normalizer`], the
//! [`naming`] helpers for capture files, and the immutable [`config`]. The
//! process, filesystem and timing half lives in `hopwatch-runner`.

pub mod config;
pub mod naming;
pub mod normalizer;
pub mod types;

pub use config::{Config, ConfigError};
pub use normalizer::{normalize, normalize_at, LegacyFormatError, Normalized};
pub use types::{
    CanonicalRecord, CanonicalResult, Dialect, HopRecord, ProbeRequest, RawProbeOutput,
};
