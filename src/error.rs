use std::time::Duration;

use thiserror::Error;

/// Failure to open or read a target through a [`crate::transport::Transport`].
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Unsupported scheme `{scheme}` in {target}")]
    UnsupportedScheme { scheme: String, target: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Resource not found: {0}")]
    NotFound(String),
}

/// Why a single target resolved to `failed`.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Deadline of {0:?} elapsed before dimensions were found")]
    Timeout(Duration),

    #[error("Content is not a supported image format")]
    Unrecognized,

    #[error("No dimensions found within the first {limit} bytes")]
    GrowthCapExceeded { limit: usize },

    #[error("Stream ended after {received} bytes before dimensions were found")]
    Truncated { received: usize },
}

/// Rejected configuration values. These are the only errors surfaced to callers.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Timeout must be a positive number of seconds, got {0}")]
    InvalidTimeout(f64),

    #[error("Initial read window must be at least one byte")]
    EmptyWindow,

    #[error("Growth cap {max_buffer} is smaller than the initial window {initial_window}")]
    CapBelowWindow {
        initial_window: usize,
        max_buffer: usize,
    },

    #[error("Concurrency ceiling must be at least 1")]
    ZeroConcurrency,

    #[error("Could not build HTTP client: {0}")]
    Client(String),
}
