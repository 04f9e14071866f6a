use connectors::error::FeedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControllerError {
    /// Backend failure, surfaced with the backend's own message.
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("The feed is exhausted, start a new query to fetch more results")]
    FeedExhausted,

    #[error("The request was cancelled")]
    Cancelled,

    #[error("'{0}' is not a feed link")]
    NotAFeed(String),

    #[error("'{0}' is not a resource link")]
    NotAResource(String),

    #[error("'{0}' is not a stored procedure link")]
    NotAStoredProcedure(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
