use crate::resource::kind::ResourceType;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("Link is empty")]
    Empty,

    #[error("Link '{0}' contains an empty segment")]
    EmptySegment(String),

    #[error("Link '{0}' names an unknown feed segment '{1}'")]
    UnknownFeed(String, String),
}

/// Slash separated address of a resource or of a feed.
///
/// Segments alternate between feed names and resource ids, so a link with an
/// odd number of segments addresses a feed (`dbs/db1/colls`) and one with an
/// even number addresses a single resource (`dbs/db1/colls/c1`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceLink(String);

impl ResourceLink {
    /// Feed of all databases in the account.
    pub fn databases() -> Self {
        ResourceLink(ResourceType::Database.feed_segment().to_string())
    }

    /// Feed of all offers in the account.
    pub fn offers() -> Self {
        ResourceLink(ResourceType::Offer.feed_segment().to_string())
    }

    pub fn database(id: &str) -> Self {
        Self::databases().child(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    pub fn is_feed(&self) -> bool {
        self.segments().count() % 2 == 1
    }

    /// Feed of `kind` nested under this resource.
    pub fn feed(&self, kind: ResourceType) -> Self {
        ResourceLink(format!("{}/{}", self.0, kind.feed_segment()))
    }

    /// Resource `id` inside this feed.
    pub fn child(&self, id: &str) -> Self {
        ResourceLink(format!("{}/{}", self.0, id))
    }

    pub fn parent(&self) -> Option<Self> {
        self.0
            .rsplit_once('/')
            .map(|(parent, _)| ResourceLink(parent.to_string()))
    }

    /// Last segment: the resource id, or the feed name for feed links.
    pub fn last_segment(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Type of the resources held by this feed, or of this resource.
    pub fn kind(&self) -> Option<ResourceType> {
        if self.is_feed() {
            ResourceType::from_feed_segment(self.last_segment())
        } else {
            self.parent()
                .and_then(|feed| ResourceType::from_feed_segment(feed.last_segment()))
        }
    }

    /// Whether `self` is `other` or lives somewhere underneath it.
    pub fn is_within(&self, other: &ResourceLink) -> bool {
        self.0 == other.0
            || (self.0.starts_with(&other.0) && self.0[other.0.len()..].starts_with('/'))
    }
}

impl FromStr for ResourceLink {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(LinkError::Empty);
        }

        for (idx, segment) in trimmed.split('/').enumerate() {
            if segment.is_empty() {
                return Err(LinkError::EmptySegment(s.to_string()));
            }
            if idx % 2 == 0 && ResourceType::from_feed_segment(segment).is_none() {
                return Err(LinkError::UnknownFeed(s.to_string(), segment.to_string()));
            }
        }

        Ok(ResourceLink(trimmed.to_string()))
    }
}

impl TryFrom<String> for ResourceLink {
    type Error = LinkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResourceLink> for String {
    fn from(link: ResourceLink) -> Self {
        link.0
    }
}

impl fmt::Display for ResourceLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
