use std::time::Duration;
use thiserror::Error;

/// Failure of a single search request. Cloned into overlay state so the
/// error banner and retry affordance can be rendered from it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("search timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("search endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("search transport error: {0}")]
    Transport(String),

    #[error("invalid search response: {0}")]
    Decode(String),

    #[error("search endpoint is not configured")]
    NotConfigured,
}

impl SearchError {
    /// Every failure may be retried by the user; none is retried automatically.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SearchError::NotConfigured)
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SearchError::Decode(err.to_string())
        } else {
            SearchError::Transport(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
