//! Configuration for the reconciliation engine.
//!
//! Layered, each layer overriding the previous one:
//!
//! 1. built-in defaults (the reference `TATA_INR` market on localhost),
//! 2. an optional TOML file,
//! 3. environment variables:
//!    - `FLOW_VENUE_URL`          (default: "http://localhost:3000")
//!    - `FLOW_MARKET`             (default: "TATA_INR")
//!    - `FLOW_ACCOUNT_ID`         (default: "5")
//!    - `FLOW_SEED`               (default: unset, OS entropy)
//!    - `FLOW_REQUEST_TIMEOUT_MS` (default: "5000")
//! 4. command-line flags (applied by the binary).
//!
//! The result is validated once and never changes while the loop runs.

use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use flow_core::{ConfigError, MarketConfig};

pub const CONFIG_PATH_ENV: &str = "FLOW_CONFIG";

#[derive(Debug, Error)]
pub enum EngineConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("environment variable {key}={value:?} is not valid")]
    Env { key: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error(transparent)]
    Market(#[from] ConfigError),
}

/// Where and as whom to trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VenueSettings {
    pub base_url: String,
    pub market: String,
    pub account_id: String,
    pub request_timeout_ms: u64,
}

impl Default for VenueSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            market: "TATA_INR".to_string(),
            account_id: "5".to_string(),
            request_timeout_ms: 5_000,
        }
    }
}

impl VenueSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Inter-cycle sleep and failure backoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopTiming {
    /// Fixed part of the inter-cycle sleep.
    pub cycle_base_ms: u64,

    /// Upper bound of the uniform jitter added to `cycle_base_ms`.
    pub cycle_jitter_ms: u64,

    /// Wait after a failed cycle before retrying.
    pub backoff_ms: u64,
}

impl Default for LoopTiming {
    fn default() -> Self {
        Self {
            cycle_base_ms: 500,
            cycle_jitter_ms: 300,
            backoff_ms: 5_000,
        }
    }
}

impl LoopTiming {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

/// Everything the engine needs, fixed at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub venue: VenueSettings,
    pub market: MarketConfig,
    pub timing: LoopTiming,

    /// RNG seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,

    /// Cancel every open order of the account on graceful shutdown.
    pub cancel_on_shutdown: bool,

    /// Stop after this many successful cycles.
    pub max_cycles: Option<u64>,
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, EngineConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply `FLOW_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), EngineConfigError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Apply `FLOW_*` overrides from an arbitrary lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), EngineConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("FLOW_VENUE_URL") {
            self.venue.base_url = url;
        }
        if let Some(market) = lookup("FLOW_MARKET") {
            self.venue.market = market;
        }
        if let Some(account) = lookup("FLOW_ACCOUNT_ID") {
            self.venue.account_id = account;
        }
        if let Some(seed) = read_override(&lookup, "FLOW_SEED")? {
            self.seed = Some(seed);
        }
        if let Some(timeout) = read_override(&lookup, "FLOW_REQUEST_TIMEOUT_MS")? {
            self.venue.request_timeout_ms = timeout;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), EngineConfigError> {
        if self.venue.base_url.trim().is_empty() {
            return Err(EngineConfigError::Empty("venue.base_url"));
        }
        if self.venue.market.trim().is_empty() {
            return Err(EngineConfigError::Empty("venue.market"));
        }
        if self.venue.account_id.trim().is_empty() {
            return Err(EngineConfigError::Empty("venue.account_id"));
        }
        if self.venue.request_timeout_ms == 0 {
            return Err(EngineConfigError::Zero("venue.request_timeout_ms"));
        }
        if self.timing.backoff_ms == 0 {
            return Err(EngineConfigError::Zero("timing.backoff_ms"));
        }
        self.market.validate()?;
        Ok(())
    }
}

fn read_override<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, EngineConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| EngineConfigError::Env { key, value }),
        None => Ok(None),
    }
}
