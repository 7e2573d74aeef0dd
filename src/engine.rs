//! Public entry points and result aggregation.

use std::fmt;
use std::time::Instant;

use tracing::info;

use crate::config::{EngineConfig, validate_timeout};
use crate::dispatch::{Limits, Outcome, run_concurrent, run_sequential};
use crate::error::ConfigError;
use crate::transport::{DispatchMode, HttpTransport, ModeProbe, Transport};
use crate::types::{BatchResult, ProbeResult};

/// Owns a transport and the configuration every batch call runs with.
///
/// Nothing carries over between calls except the configuration, which only
/// changes through [`Engine::set_timeout`].
pub struct Engine<T: Transport = HttpTransport> {
    transport: T,
    config: EngineConfig,
    mode_probe: Option<Box<dyn ModeProbe>>,
}

impl Engine<HttpTransport> {
    /// HTTP engine with default settings.
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_config(EngineConfig::default())
    }

    /// HTTP engine configured from `FASTPROBE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::with_config(EngineConfig::from_env())
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Self::with_transport(transport, config)
    }
}

impl<T: Transport> Engine<T> {
    pub fn with_transport(transport: T, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            transport,
            config,
            mode_probe: None,
        })
    }

    /// Replaces the default mode probe, which asks the transport.
    pub fn with_mode_probe(mut self, probe: impl ModeProbe + 'static) -> Self {
        self.mode_probe = Some(Box::new(probe));
        self
    }

    /// Sets the per-target deadline for subsequent batch calls.
    pub fn set_timeout(&mut self, secs: f64) -> Result<(), ConfigError> {
        validate_timeout(secs)?;
        self.config.timeout_secs = secs;
        Ok(())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mode the next batch will run in.
    pub fn dispatch_mode(&self) -> DispatchMode {
        match &self.mode_probe {
            Some(probe) => probe.probe(),
            None if self.config.force_sequential => DispatchMode::Sequential,
            None if self.transport.supports_multiplexing() => DispatchMode::Concurrent,
            None => DispatchMode::Sequential,
        }
    }

    /// Probes every target and maps each to its result.
    ///
    /// Duplicate targets are fetched independently; the last one wins.
    pub async fn batch<I, S>(&self, targets: I) -> BatchResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.batch_detailed(targets)
            .await
            .into_iter()
            .map(|(target, result)| (target, ProbeResult::from(result)))
            .collect()
    }

    /// Like [`Engine::batch`] but keeps every outcome, in input order, with
    /// the reason for each failure.
    pub async fn batch_detailed<I, S>(&self, targets: I) -> Vec<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let targets: Vec<String> = targets.into_iter().map(Into::into).collect();
        let limits = Limits::from_config(&self.config);
        let mode = self.dispatch_mode();
        let started = Instant::now();
        let count = targets.len();

        let outcomes = match mode {
            DispatchMode::Concurrent => {
                run_concurrent(&self.transport, targets, limits, self.config.max_concurrency).await
            }
            DispatchMode::Sequential => run_sequential(&self.transport, targets, limits).await,
        };

        let succeeded = outcomes.iter().filter(|(_, r)| r.is_ok()).count();
        info!(
            targets = count,
            succeeded,
            failed = count - succeeded,
            ?mode,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch finished"
        );

        outcomes
    }

    /// Probes a single target.
    pub async fn probe(&self, target: &str) -> ProbeResult {
        self.batch_detailed([target])
            .await
            .pop()
            .map_or(ProbeResult::Failed, |(_, result)| result.into())
    }
}

impl<T: Transport + fmt::Debug> fmt::Debug for Engine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("transport", &self.transport)
            .field("config", &self.config)
            .field("mode", &self.dispatch_mode())
            .finish()
    }
}
