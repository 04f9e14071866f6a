use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyLevel {
    Strong,
    BoundedStaleness,
    Session,
    Eventual,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IndexingDirective {
    #[default]
    Default,
    Include,
    Exclude,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccessConditionType {
    IfMatch,
    IfNoneMatch,
}

/// Optimistic concurrency check against a resource etag.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AccessCondition {
    #[serde(rename = "type")]
    pub kind: AccessConditionType,
    pub condition: String,
}

impl AccessCondition {
    /// Whether a resource carrying `etag` satisfies the condition.
    pub fn is_met(&self, etag: Option<&str>) -> bool {
        let matches = etag == Some(self.condition.as_str());
        match self.kind {
            AccessConditionType::IfMatch => matches,
            AccessConditionType::IfNoneMatch => !matches,
        }
    }
}

/// Options attached to a single-resource request (create, read, replace, delete).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RequestOptions {
    pub indexing_directive: IndexingDirective,
    pub access_condition: Option<AccessCondition>,
    pub consistency_level: Option<ConsistencyLevel>,
    pub pre_trigger_include: Vec<String>,
    pub post_trigger_include: Vec<String>,
    /// Only meaningful when creating or replacing a collection.
    pub offer_type: Option<String>,
}

/// Splits a `;` separated trigger list, dropping empty entries.
pub fn parse_trigger_list(text: &str) -> Vec<String> {
    text.split(';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
