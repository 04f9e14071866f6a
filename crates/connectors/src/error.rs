use model::resource::link::LinkError;
use thiserror::Error;

/// Failures reported by a feed or resource backend.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The backend answered with an HTTP-like error status.
    #[error("Request failed with status {code}: {message}")]
    Status { code: u16, message: String },

    /// The request never got an answer (connection refused, reset, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// The continuation token was not issued by this backend for this feed.
    #[error("Invalid continuation token: {0}")]
    InvalidContinuation(String),

    #[error("Invalid link: {0}")]
    Link(#[from] LinkError),
}

impl FeedError {
    pub fn status(code: u16, message: impl Into<String>) -> Self {
        FeedError::Status {
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::status(400, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::status(404, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::status(409, message)
    }

    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::status(412, message)
    }

    pub fn throttled(message: impl Into<String>) -> Self {
        Self::status(429, message)
    }

    /// HTTP-like status code, when the failure carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FeedError::Status { code, .. } => Some(*code),
            FeedError::InvalidContinuation(_) | FeedError::Link(_) => Some(400),
            FeedError::Timeout(_) => Some(408),
            FeedError::Transport(_) => None,
        }
    }
}
