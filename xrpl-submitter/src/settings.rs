//! Settings for the client and the submission engine.
//!
//! Values are layered, later sources taking precedence:
//!
//! 1. Built-in defaults.
//! 2. An optional config file (JSON or TOML, chosen by extension).
//! 3. Environment variables prefixed with `XRPL_`, using `__` to descend into
//!    nested sections, e.g. `XRPL_TIMEOUT_MS=5000` or `XRPL_TRACING__LEVEL=debug`.

use std::{path::Path, time::Duration};

use config::{Config, Environment, File};
use eyre::{Context, Result};
use serde::Deserialize;

use self::trace::TracingConfig;

pub mod trace;

/// Default deadline for a single wire call.
pub const DEFAULT_TIMEOUT_MS: u64 = 20_000;
/// Approximate time for a ledger to close.
pub const DEFAULT_LEDGER_CLOSE_TIME_MS: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Deadline for each individual request
    pub timeout_ms: u64,
    /// Pause between finality polling rounds
    pub ledger_close_time_ms: u64,
    pub tracing: TracingConfig,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            ledger_close_time_ms: DEFAULT_LEDGER_CLOSE_TIME_MS,
            tracing: TracingConfig::default(),
        }
    }
}

impl ClientSettings {
    /// Load settings from the defaults, `path` if given, and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            if !path.is_file() {
                return Err(eyre::eyre!(
                    "Provided config path does not exist or is not a file ({path:?})"
                ));
            }
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix("XRPL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load config sources")?;
        config
            .try_deserialize::<ClientSettings>()
            .context("Failed to deserialize client settings")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn ledger_close_time(&self) -> Duration {
        Duration::from_millis(self.ledger_close_time_ms)
    }
}
