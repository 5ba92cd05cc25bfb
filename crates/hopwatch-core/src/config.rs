//! Configuration types for hopwatch.
//!
//! [`Config::load`] layers three sources, later ones winning: the built-in
//! defaults below, an optional TOML file, and `MTR_*` environment variables.
//! [`Config::defaults`] returns the built-in defaults alone, and
//! [`Config::from_env_map`] takes an explicit variable map (useful in tests).
//!
//! The result is immutable: it is read once at startup and handed to the
//! scheduler by value.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::types::{Dialect, UnknownDialect};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
interval     = 300
count        = 10
output_path  = "/data/mtr"
bin          = "/usr/bin/mtr"
destinations = "1.1.1.1"
dialect      = "legacy"
"#;

/// Prefix of the environment variables read by [`Config::load`].
pub const ENV_PREFIX: &str = "MTR";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("packet count must be at least 1")]
    ZeroCount,
    #[error("no destinations configured")]
    NoDestinations,
    #[error(transparent)]
    Dialect(#[from] UnknownDialect),
}

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Mirrors the flat key set of the config sources before validation.
#[derive(Debug, Clone, Deserialize)]
struct RawConfig {
    interval: u64,
    count: u32,
    output_path: PathBuf,
    bin: PathBuf,
    destinations: String,
    dialect: String,
    #[serde(default)]
    probe_timeout_secs: Option<u64>,
}

/// Validated runner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Sleep between full cycles.
    pub interval: Duration,
    /// Packets sent per probe run.
    pub count: NonZeroU32,
    /// Directory receiving one file per capture.
    pub output_path: PathBuf,
    /// Path to the probe binary.
    pub bin: PathBuf,
    /// Destinations, probed in this order every cycle.
    pub destinations: Vec<String>,
    /// Report mode the probe is launched in.
    pub dialect: Dialect,
    /// Upper bound on a single probe run. `None` waits indefinitely.
    pub probe_timeout: Option<Duration>,
}

impl Config {
    /// Load defaults, then `file` if given, then the process environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::build(file, None)
    }

    /// Like [`Config::load`] but reading variables from `env` instead of the
    /// process environment.
    pub fn from_env_map(
        file: Option<&Path>,
        env: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        Self::build(file, Some(env))
    }

    /// Return the built-in defaults without touching the filesystem or the
    /// environment.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize::<RawConfig>()
            .map_err(ConfigError::from)
            .and_then(Self::validate)
            .expect("built-in default config must validate")
    }

    fn build(file: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml));
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .ignore_empty(true)
                .source(env),
        );

        let raw: RawConfig = builder.build()?.try_deserialize()?;
        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Self, ConfigError> {
        let count = NonZeroU32::new(raw.count).ok_or(ConfigError::ZeroCount)?;
        let destinations = parse_destinations(&raw.destinations);
        if destinations.is_empty() {
            return Err(ConfigError::NoDestinations);
        }

        Ok(Self {
            interval: Duration::from_secs(raw.interval),
            count,
            output_path: raw.output_path,
            bin: raw.bin,
            destinations,
            dialect: raw.dialect.parse()?,
            probe_timeout: raw
                .probe_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Split a comma-separated destination list, trimming entries and dropping
/// empty ones.
pub fn parse_destinations(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
