//! Engine configuration.
//!
//! Defaults can be overridden from the environment:
//! - `FASTPROBE_TIMEOUT`: per-target deadline in seconds (default: 10)
//! - `FASTPROBE_MAX_BUFFER`: growth cap in bytes (default: 1 MiB)
//! - `FASTPROBE_MAX_CONCURRENCY`: simultaneous connections (default: unbounded)
//! - `FASTPROBE_USER_AGENT`: `User-Agent` sent with every request
//! - `FASTPROBE_SEQUENTIAL`: `1`/`true` disables multiplexing

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;
use crate::types::{DEFAULT_INITIAL_WINDOW, DEFAULT_MAX_BUFFER, DEFAULT_TIMEOUT_SECS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct EngineConfig {
    /// Deadline applied to each target, measured from the moment it is opened
    pub timeout_secs: f64,
    /// Bytes requested before the first sniff
    pub initial_window: usize,
    /// Hard ceiling on bytes accumulated for a single target
    pub max_buffer: usize,
    /// Maximum number of targets in flight at once (`None` = all of them)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<usize>,
    pub user_agent: String,
    /// Report the transport as unable to multiplex
    pub force_sequential: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            initial_window: DEFAULT_INITIAL_WINDOW,
            max_buffer: DEFAULT_MAX_BUFFER,
            max_concurrency: None,
            user_agent: concat!("fastprobe/", env!("CARGO_PKG_VERSION")).to_string(),
            force_sequential: false,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with any `FASTPROBE_*` variables that parse.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(timeout) = env_parse::<f64>("FASTPROBE_TIMEOUT") {
            config.timeout_secs = timeout;
        }
        if let Some(cap) = env_parse::<usize>("FASTPROBE_MAX_BUFFER") {
            config.max_buffer = cap;
        }
        if let Some(limit) = env_parse::<usize>("FASTPROBE_MAX_CONCURRENCY") {
            config.max_concurrency = Some(limit);
        }
        if let Ok(agent) = std::env::var("FASTPROBE_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Ok(flag) = std::env::var("FASTPROBE_SEQUENTIAL") {
            config.force_sequential = matches!(flag.trim(), "1" | "true" | "TRUE" | "yes");
        }
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_timeout(self.timeout_secs)?;
        if self.initial_window == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        if self.max_buffer < self.initial_window {
            return Err(ConfigError::CapBelowWindow {
                initial_window: self.initial_window,
                max_buffer: self.max_buffer,
            });
        }
        if self.max_concurrency == Some(0) {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }

    pub fn with_timeout(mut self, secs: f64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_max_buffer(mut self, bytes: usize) -> Self {
        self.max_buffer = bytes;
        self
    }

    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit);
        self
    }

    pub fn sequential(mut self) -> Self {
        self.force_sequential = true;
        self
    }
}

pub(crate) fn validate_timeout(secs: f64) -> Result<(), ConfigError> {
    // Duration::from_secs_f64 panics past u64::MAX seconds
    if !secs.is_finite() || secs <= 0.0 || secs > u32::MAX as f64 {
        return Err(ConfigError::InvalidTimeout(secs));
    }
    Ok(())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}
