use crate::pagination::continuation::ContinuationToken;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Result of a single feed page.
#[derive(Clone, Debug, Serialize)]
pub struct PageResult {
    /// Records returned by the backend, in feed order.
    pub items: Vec<Value>,

    /// Number of records in `items`.
    pub item_count: usize,

    /// Token for the next page. `None` means the feed is exhausted.
    pub continuation_token: Option<ContinuationToken>,

    /// Response headers as reported by the backend.
    pub response_metadata: BTreeMap<String, String>,

    /// Wall-clock time spent on the fetch (ms).
    pub took_ms: u128,
}

impl PageResult {
    pub fn new(
        items: Vec<Value>,
        continuation_token: Option<ContinuationToken>,
        response_metadata: BTreeMap<String, String>,
        took_ms: u128,
    ) -> Self {
        PageResult {
            item_count: items.len(),
            items,
            continuation_token,
            response_metadata,
            took_ms,
        }
    }

    /// Whether the backend reported the end of the feed.
    pub fn reached_end(&self) -> bool {
        self.continuation_token.is_none()
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.response_metadata
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
