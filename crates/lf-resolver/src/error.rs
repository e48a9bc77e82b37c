//! Configuration and publishing error types.

use thiserror::Error;

/// Errors raised while assembling a run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    MissingInput(&'static str),

    #[error("cannot read config {path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid config: {0}")]
    Parse(String),

    #[error("cannot build HTTP client: {0}")]
    Client(String),
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while persisting a resolution. Logged, never fatal.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid table url {0}")]
    Url(String),

    #[error("table service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for sink results.
pub type SinkResult<T> = Result<T, SinkError>;

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for SinkError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url().to_string())
    }
}
