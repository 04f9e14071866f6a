use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub const HEADER_REQUEST_CHARGE: &str = "x-ms-request-charge";
pub const HEADER_ITEM_COUNT: &str = "x-ms-item-count";
pub const HEADER_CONTINUATION: &str = "x-ms-continuation";
pub const HEADER_ACTIVITY_ID: &str = "x-ms-activity-id";
pub const HEADER_ETAG: &str = "etag";

pub type ResponseHeaders = BTreeMap<String, String>;

/// One page of a feed, as returned by the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedResponse {
    pub items: Vec<Value>,

    /// Raw token for the next page. Backends may send `None` or an empty
    /// string at the end of the feed.
    pub continuation: Option<String>,

    pub headers: ResponseHeaders,
}

/// Outcome of a single-resource request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourceResponse {
    /// The resource after the operation; `Value::Null` for deletes.
    pub resource: Value,

    pub headers: ResponseHeaders,
}
