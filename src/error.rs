use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Why a story fetch failed. Every variant collapses into the same
/// `is_error` flag once it reaches the reducer; the detail is only logged.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    #[error("search endpoint returned {0}")]
    Status(StatusCode),

    #[error("malformed search response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl FetchError {
    /// Short label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(_) | FetchError::Status(_) => "network",
            FetchError::Parse(_) => "parse",
            FetchError::Timeout(_) => "timeout",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("search history was queried before it was seeded")]
    EmptyHistory,
}
