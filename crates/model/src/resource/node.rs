use crate::resource::{kind::ResourceType, link::ResourceLink};
use serde::Serialize;
use serde_json::Value;

/// A node of the resource tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum ResourceNode {
    /// Root of the tree: one database account.
    Account { endpoint: String },

    Database { link: ResourceLink, body: Value },

    Collection { link: ResourceLink, body: Value },

    /// Grouping node for a nested feed (Users, Triggers, ...).
    Feed { kind: ResourceType, link: ResourceLink },

    /// Any other resource (document, user, trigger, offer, ...).
    Item {
        kind: ResourceType,
        link: ResourceLink,
        body: Value,
    },
}

impl ResourceNode {
    /// Builds the node for a resource read from `feed`.
    pub fn from_resource(feed: &ResourceLink, body: Value) -> Option<Self> {
        let id = body.get("id").and_then(Value::as_str)?.to_string();
        let kind = feed.kind()?;
        let link = feed.child(&id);

        Some(match kind {
            ResourceType::Database => ResourceNode::Database { link, body },
            ResourceType::DocumentCollection => ResourceNode::Collection { link, body },
            kind => ResourceNode::Item { kind, link, body },
        })
    }

    pub fn feed(parent: &ResourceLink, kind: ResourceType) -> Self {
        ResourceNode::Feed {
            kind,
            link: parent.feed(kind),
        }
    }

    /// Text shown for the node in the tree.
    pub fn label(&self) -> String {
        match self {
            ResourceNode::Account { endpoint } => endpoint.clone(),
            ResourceNode::Feed { kind, .. } => kind.feed_label().to_string(),
            ResourceNode::Database { link, .. }
            | ResourceNode::Collection { link, .. }
            | ResourceNode::Item { link, .. } => link.last_segment().to_string(),
        }
    }

    pub fn link(&self) -> Option<&ResourceLink> {
        match self {
            ResourceNode::Account { .. } => None,
            ResourceNode::Database { link, .. }
            | ResourceNode::Collection { link, .. }
            | ResourceNode::Feed { link, .. }
            | ResourceNode::Item { link, .. } => Some(link),
        }
    }

    pub fn kind(&self) -> Option<ResourceType> {
        match self {
            ResourceNode::Account { .. } => None,
            ResourceNode::Database { .. } => Some(ResourceType::Database),
            ResourceNode::Collection { .. } => Some(ResourceType::DocumentCollection),
            ResourceNode::Feed { kind, .. } | ResourceNode::Item { kind, .. } => Some(*kind),
        }
    }

    pub fn body(&self) -> Option<&Value> {
        match self {
            ResourceNode::Database { body, .. }
            | ResourceNode::Collection { body, .. }
            | ResourceNode::Item { body, .. } => Some(body),
            ResourceNode::Account { .. } | ResourceNode::Feed { .. } => None,
        }
    }
}
