use model::options::{
    feed::FeedOptions,
    request::{ConsistencyLevel, IndexingDirective, RequestOptions, parse_trigger_list},
};
use serde::{Deserialize, Serialize};

/// Page size asked for when nothing is configured.
pub const DEFAULT_MAX_ITEM_COUNT: i32 = 100;

/// Defaults applied to every feed query.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FeedSettings {
    /// `-1` lets the backend pick the page size.
    pub max_item_count: i32,
    pub enable_scan_in_query: bool,
    pub consistency_level: Option<ConsistencyLevel>,
}

impl Default for FeedSettings {
    fn default() -> Self {
        FeedSettings {
            max_item_count: DEFAULT_MAX_ITEM_COUNT,
            enable_scan_in_query: false,
            consistency_level: None,
        }
    }
}

impl FeedSettings {
    pub fn feed_options(&self) -> FeedOptions {
        FeedOptions {
            max_item_count: Some(self.max_item_count),
            request_continuation: None,
            enable_scan_in_query: self.enable_scan_in_query.then_some(true),
            consistency_level: self.consistency_level,
        }
    }
}

/// Defaults applied to every single-resource request. Trigger lists are kept
/// as the `;` separated text users type.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RequestSettings {
    pub indexing_directive: IndexingDirective,
    pub consistency_level: Option<ConsistencyLevel>,
    pub pre_triggers: String,
    pub post_triggers: String,
    pub offer_type: Option<String>,
}

impl RequestSettings {
    pub fn request_options(&self) -> RequestOptions {
        RequestOptions {
            indexing_directive: self.indexing_directive,
            access_condition: None,
            consistency_level: self.consistency_level,
            pre_trigger_include: parse_trigger_list(&self.pre_triggers),
            post_trigger_include: parse_trigger_list(&self.post_triggers),
            offer_type: self.offer_type.clone(),
        }
    }
}
