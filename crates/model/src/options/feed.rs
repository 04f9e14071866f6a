use crate::{options::request::ConsistencyLevel, pagination::continuation::ContinuationToken};
use serde::{Deserialize, Serialize};

/// Options attached to a single feed request.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedOptions {
    /// Page size. `-1` (or `None`) lets the backend pick.
    pub max_item_count: Option<i32>,

    /// Token of the page to resume from.
    pub request_continuation: Option<ContinuationToken>,

    /// `None` keeps the backend default.
    pub enable_scan_in_query: Option<bool>,

    pub consistency_level: Option<ConsistencyLevel>,
}

impl FeedOptions {
    pub fn with_max_item_count(mut self, count: i32) -> Self {
        self.max_item_count = Some(count);
        self
    }

    pub fn with_continuation(mut self, token: Option<ContinuationToken>) -> Self {
        self.request_continuation = token;
        self
    }

    /// Page size to use, if the caller asked for a positive one.
    pub fn page_size(&self) -> Option<usize> {
        self.max_item_count
            .filter(|count| *count > 0)
            .map(|count| count as usize)
    }
}
