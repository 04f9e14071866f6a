use crate::{
    error::FeedError,
    memory::seed::{AccountSeed, resource_body},
};
use model::resource::{kind::ResourceType, link::ResourceLink};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Feeds of an in-memory account, keyed by feed link.
///
/// Each feed keeps its resources in insertion order, which is the order feed
/// reads and queries return them in.
#[derive(Debug, Default)]
pub struct MemoryStore {
    feeds: BTreeMap<ResourceLink, Vec<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: AccountSeed) -> Result<Self, FeedError> {
        let mut store = MemoryStore::new();
        let dbs = ResourceLink::databases();

        for offer in seed.offers {
            store.insert(&ResourceLink::offers(), offer)?;
        }

        for db in seed.databases {
            store.insert(&dbs, resource_body(&db.id, &db.properties))?;
            let db_link = dbs.child(&db.id);

            for coll in db.collections {
                let colls = db_link.feed(ResourceType::DocumentCollection);
                store.insert(&colls, resource_body(&coll.id, &coll.properties))?;
                let coll_link = colls.child(&coll.id);

                let nested = [
                    (ResourceType::Document, coll.documents),
                    (ResourceType::StoredProcedure, coll.stored_procedures),
                    (ResourceType::Trigger, coll.triggers),
                    (ResourceType::UserDefinedFunction, coll.user_defined_functions),
                    (ResourceType::Conflict, coll.conflicts),
                ];
                for (kind, resources) in nested {
                    let feed = coll_link.feed(kind);
                    for resource in resources {
                        store.insert(&feed, resource)?;
                    }
                }
            }

            for user in db.users {
                let users = db_link.feed(ResourceType::User);
                store.insert(&users, resource_body(&user.id, &user.properties))?;
                let permissions = users.child(&user.id).feed(ResourceType::Permission);
                for permission in user.permissions {
                    store.insert(&permissions, permission)?;
                }
            }
        }

        debug!(feeds = store.feeds.len(), "Seeded in-memory account");
        Ok(store)
    }

    /// Resources of a feed. Fails with 404 when the owning resource is gone.
    pub fn feed(&self, feed: &ResourceLink) -> Result<&[Value], FeedError> {
        if !feed.is_feed() {
            return Err(FeedError::bad_request(format!("'{feed}' is not a feed link")));
        }
        if !self.owner_exists(feed) {
            return Err(FeedError::not_found(format!("Owner of feed '{feed}' not found")));
        }
        Ok(self.feeds.get(feed).map(Vec::as_slice).unwrap_or_default())
    }

    pub fn get(&self, link: &ResourceLink) -> Option<&Value> {
        let feed = link.parent()?;
        self.feeds
            .get(&feed)?
            .iter()
            .find(|r| resource_id(r) == Some(link.last_segment()))
    }

    /// Adds `body` to `feed` and returns the stored resource, system
    /// properties included.
    pub fn insert(&mut self, feed: &ResourceLink, body: Value) -> Result<Value, FeedError> {
        if !feed.is_feed() {
            return Err(FeedError::bad_request(format!("'{feed}' is not a feed link")));
        }
        if !self.owner_exists(feed) {
            return Err(FeedError::not_found(format!("Owner of feed '{feed}' not found")));
        }

        let mut body = body;
        let existing = resource_id(&body).map(str::to_string);
        let id = match existing {
            Some(id) => id,
            None if body.is_object() => {
                let id = uuid::Uuid::new_v4().to_string();
                body["id"] = Value::String(id.clone());
                id
            }
            None => {
                return Err(FeedError::bad_request("Resource body must be a JSON object"));
            }
        };

        if id.contains('/') || id.is_empty() {
            return Err(FeedError::bad_request(format!("Invalid resource id '{id}'")));
        }

        let link = feed.child(&id);
        if self.get(&link).is_some() {
            return Err(FeedError::conflict(format!(
                "Resource with id '{id}' already exists"
            )));
        }

        stamp(&mut body, &link);
        self.feeds.entry(feed.clone()).or_default().push(body.clone());
        Ok(body)
    }

    pub fn replace(&mut self, link: &ResourceLink, body: Value) -> Result<Value, FeedError> {
        if !body.is_object() {
            return Err(FeedError::bad_request("Resource body must be a JSON object"));
        }
        if let Some(id) = resource_id(&body)
            && id != link.last_segment()
        {
            return Err(FeedError::bad_request(format!(
                "Resource id '{id}' does not match link '{link}'"
            )));
        }

        let slot = self.slot_mut(link)?;
        let mut body = body;
        body["id"] = Value::String(link.last_segment().to_string());
        stamp(&mut body, link);
        *slot = body.clone();
        Ok(body)
    }

    /// Removes the resource and every feed nested under it.
    pub fn remove(&mut self, link: &ResourceLink) -> Result<Value, FeedError> {
        let feed = link
            .parent()
            .ok_or_else(|| FeedError::bad_request(format!("'{link}' is not a resource link")))?;
        let resources = self
            .feeds
            .get_mut(&feed)
            .ok_or_else(|| FeedError::not_found(format!("Resource '{link}' not found")))?;
        let pos = resources
            .iter()
            .position(|r| resource_id(r) == Some(link.last_segment()))
            .ok_or_else(|| FeedError::not_found(format!("Resource '{link}' not found")))?;

        let removed = resources.remove(pos);
        self.feeds.retain(|feed, _| !feed.is_within(link));
        Ok(removed)
    }

    /// Offer whose `resource` property points at `resource`.
    pub fn offer_for(&self, resource: &ResourceLink) -> Option<&Value> {
        self.feeds
            .get(&ResourceLink::offers())?
            .iter()
            .find(|offer| offer_resource(offer) == Some(resource.as_str()))
    }

    /// Drops the offers attached to `resource`, returning how many went.
    pub fn remove_offers_for(&mut self, resource: &ResourceLink) -> usize {
        let Some(offers) = self.feeds.get_mut(&ResourceLink::offers()) else {
            return 0;
        };
        let before = offers.len();
        offers.retain(|offer| offer_resource(offer) != Some(resource.as_str()));
        before - offers.len()
    }

    fn slot_mut(&mut self, link: &ResourceLink) -> Result<&mut Value, FeedError> {
        let not_found = || FeedError::not_found(format!("Resource '{link}' not found"));
        let feed = link.parent().ok_or_else(not_found)?;
        self.feeds
            .get_mut(&feed)
            .and_then(|resources| {
                resources
                    .iter_mut()
                    .find(|r| resource_id(r) == Some(link.last_segment()))
            })
            .ok_or_else(not_found)
    }

    fn owner_exists(&self, feed: &ResourceLink) -> bool {
        match feed.parent() {
            None => true,
            Some(owner) => self.get(&owner).is_some(),
        }
    }
}

pub(crate) fn resource_id(resource: &Value) -> Option<&str> {
    resource.get("id").and_then(Value::as_str)
}

fn offer_resource(offer: &Value) -> Option<&str> {
    offer.get("resource").and_then(Value::as_str)
}

pub(crate) fn resource_etag(resource: &Value) -> Option<&str> {
    resource.get("_etag").and_then(Value::as_str)
}

fn stamp(body: &mut Value, link: &ResourceLink) {
    body["_self"] = Value::String(link.to_string());
    body["_etag"] = Value::String(format!("\"{}\"", uuid::Uuid::new_v4()));
    body["_ts"] = Value::from(chrono::Utc::now().timestamp());
}
