//! Error types for the planner.

use std::path::PathBuf;

/// All errors that can occur while planning or replaying an allocation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to read quotes file {path}: {source}")]
    QuotesRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid input: {0}")]
    Input(String),

    #[error("failed to read {path}: {source}")]
    InputRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid payload: {0}")]
    Payload(#[from] allocbook::PayloadError),

    #[error("script step {step}: {source}")]
    Step {
        step: usize,
        source: allocbook::AllocationError,
    },

    #[error("allocation is not valid: {0}")]
    Invalid(#[from] allocbook::ValidationError),

    #[error("aborted: {0}")]
    Aborted(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
