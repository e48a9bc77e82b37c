//! Provider error types.

use thiserror::Error;

/// Why a strategy adapter could not produce a usable answer.
///
/// The resolver downgrades every variant to "tier unresolved".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("provider not configured: {0}")]
    Config(String),
}

/// Convenience alias for strategy results.
pub type StrategyResult<T> = Result<T, StrategyError>;

/// Image retrieval failure. Fatal for every tier that needs pixels.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("{0}")]
    Transport(String),

    #[error("Failed to download image: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("image {0} has no content")]
    Empty(String),

    #[error("image source not configured: {0}")]
    Config(String),
}

/// Convenience alias for image fetch results.
pub type FetchResult<T> = Result<T, FetchError>;

impl StrategyError {
    /// Classify a reqwest failure, separating client-side timeouts.
    ///
    /// The request URL is stripped: adapters carry API keys in the query.
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            Self::Timeout { timeout_secs }
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url().to_string())
    }
}
