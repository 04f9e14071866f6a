use crate::{
    error::FeedError,
    feed::{
        client::{FeedClient, ResourceClient},
        response::{
            FeedResponse, HEADER_ACTIVITY_ID, HEADER_CONTINUATION, HEADER_ETAG,
            HEADER_ITEM_COUNT, HEADER_REQUEST_CHARGE, ResourceResponse, ResponseHeaders,
        },
    },
    memory::{
        query::{self, FeedQuery},
        seed::AccountSeed,
        store::{MemoryStore, resource_etag, resource_id},
    },
};
use async_trait::async_trait;
use model::{
    options::{
        feed::FeedOptions,
        request::{AccessConditionType, RequestOptions},
    },
    resource::{kind::ResourceType, link::ResourceLink},
};
use serde_json::{Value, json};
use std::{
    collections::VecDeque,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Offer type given to collections created without one.
pub const DEFAULT_OFFER_TYPE: &str = "S1";

/// In-process stand-in for a document database account.
///
/// Queries scan `max_item_count` stored records per page and return the ones
/// matching the filter, so a page can be empty while the feed still has more
/// to give. Continuation tokens have the form `{feed_link}#{offset}`.
///
/// Indexing directives, consistency levels, trigger lists and scan hints are
/// accepted and logged but do not change the outcome. Stored procedures are
/// not interpreted: executing one answers with the parameters it was given.
pub struct MemoryFeedClient {
    store: RwLock<MemoryStore>,
    failures: Mutex<VecDeque<FeedError>>,
    latency: Option<Duration>,
    requests: AtomicU64,
}

impl MemoryFeedClient {
    pub fn new(store: MemoryStore) -> Self {
        MemoryFeedClient {
            store: RwLock::new(store),
            failures: Mutex::new(VecDeque::new()),
            latency: None,
            requests: AtomicU64::new(0),
        }
    }

    pub fn from_seed(seed: AccountSeed) -> Result<Self, FeedError> {
        Ok(Self::new(MemoryStore::from_seed(seed)?))
    }

    pub fn from_seed_json(text: &str) -> Result<Self, FeedError> {
        let seed = AccountSeed::from_json(text)
            .map_err(|e| FeedError::bad_request(format!("Invalid account seed: {e}")))?;
        Self::from_seed(seed)
    }

    /// Delays every request by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes the next request fail with `error`. Queued errors are consumed
    /// in order, one per request.
    pub async fn fail_next(&self, error: FeedError) {
        self.failures.lock().await.push_back(error);
    }

    /// Number of requests received so far, failed ones included.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    async fn begin_request(&self) -> Result<(), FeedError> {
        self.requests.fetch_add(1, Ordering::Relaxed);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match self.failures.lock().await.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn page(
        &self,
        feed_link: &ResourceLink,
        query: &FeedQuery,
        options: &FeedOptions,
    ) -> Result<FeedResponse, FeedError> {
        self.begin_request().await?;
        debug!(
            feed = %feed_link,
            max_item_count = ?options.max_item_count,
            enable_scan_in_query = ?options.enable_scan_in_query,
            consistency_level = ?options.consistency_level,
            "Feed request options"
        );

        let offset = match &options.request_continuation {
            Some(token) => decode_continuation(feed_link, token.as_str())?,
            None => 0,
        };
        let page_size = options.page_size().unwrap_or(DEFAULT_PAGE_SIZE);

        let store = self.store.read().await;
        let records = store.feed(feed_link)?;
        if offset > records.len() {
            return Err(FeedError::InvalidContinuation(format!(
                "offset {offset} is past the end of feed '{feed_link}'"
            )));
        }

        let end = (offset + page_size).min(records.len());
        let scanned = &records[offset..end];
        let items: Vec<Value> = scanned
            .iter()
            .filter(|record| query.matches(record))
            .cloned()
            .collect();
        let continuation = (end < records.len()).then(|| encode_continuation(feed_link, end));

        debug!(
            feed = %feed_link,
            offset,
            scanned = scanned.len(),
            matched = items.len(),
            has_more = continuation.is_some(),
            "Served feed page"
        );

        let mut headers = base_headers(2.0 + 0.4 * scanned.len() as f64);
        headers.insert(HEADER_ITEM_COUNT.to_string(), items.len().to_string());
        if let Some(token) = &continuation {
            headers.insert(HEADER_CONTINUATION.to_string(), token.clone());
        }

        Ok(FeedResponse {
            items,
            continuation,
            headers,
        })
    }
}

#[async_trait]
impl FeedClient for MemoryFeedClient {
    async fn execute_query(
        &self,
        feed_link: &ResourceLink,
        query_text: &str,
        options: &FeedOptions,
    ) -> Result<FeedResponse, FeedError> {
        let query = query::parse(query_text).map_err(|e| FeedError::bad_request(e.to_string()))?;
        self.page(feed_link, &query, options).await
    }

    async fn read_feed(
        &self,
        feed_link: &ResourceLink,
        options: &FeedOptions,
    ) -> Result<FeedResponse, FeedError> {
        self.page(feed_link, &FeedQuery::scan_all(), options).await
    }
}

#[async_trait]
impl ResourceClient for MemoryFeedClient {
    async fn create(
        &self,
        feed_link: &ResourceLink,
        body: Value,
        options: &RequestOptions,
    ) -> Result<ResourceResponse, FeedError> {
        self.begin_request().await?;
        log_request("create", feed_link, options);

        let mut store = self.store.write().await;
        let created = store.insert(feed_link, body)?;

        if feed_link.kind() == Some(ResourceType::DocumentCollection) {
            let offer_type = options.offer_type.as_deref().unwrap_or(DEFAULT_OFFER_TYPE);
            let owner = feed_link.child(resource_id(&created).unwrap_or_default());
            let offer = store.insert(
                &ResourceLink::offers(),
                json!({
                    "offerType": offer_type,
                    "resource": owner.as_str(),
                    "offerResourceId": owner.last_segment(),
                }),
            )?;
            debug!(collection = %owner, offer = ?resource_id(&offer), offer_type, "Attached offer");
        }

        Ok(resource_response(created, 6.0))
    }

    async fn read(
        &self,
        link: &ResourceLink,
        options: &RequestOptions,
    ) -> Result<ResourceResponse, FeedError> {
        self.begin_request().await?;
        log_request("read", link, options);
        let store = self.store.read().await;
        let resource = store
            .get(link)
            .ok_or_else(|| FeedError::not_found(format!("Resource '{link}' not found")))?;

        if let Some(condition) = &options.access_condition
            && !condition.is_met(resource_etag(resource))
        {
            return Err(match condition.kind {
                AccessConditionType::IfNoneMatch => FeedError::status(304, "Not modified"),
                AccessConditionType::IfMatch => FeedError::precondition_failed(format!(
                    "Access condition on '{link}' was not met"
                )),
            });
        }

        Ok(resource_response(resource.clone(), 1.0))
    }

    async fn replace(
        &self,
        link: &ResourceLink,
        body: Value,
        options: &RequestOptions,
    ) -> Result<ResourceResponse, FeedError> {
        self.begin_request().await?;
        log_request("replace", link, options);
        let mut store = self.store.write().await;
        check_precondition(&store, link, options)?;
        let replaced = store.replace(link, body)?;
        Ok(resource_response(replaced, 10.0))
    }

    async fn delete(
        &self,
        link: &ResourceLink,
        options: &RequestOptions,
    ) -> Result<ResourceResponse, FeedError> {
        self.begin_request().await?;
        log_request("delete", link, options);
        let mut store = self.store.write().await;
        check_precondition(&store, link, options)?;
        store.remove(link)?;
        if link.kind() == Some(ResourceType::DocumentCollection) {
            let dropped = store.remove_offers_for(link);
            debug!(collection = %link, dropped, "Dropped offers");
        }
        Ok(ResourceResponse {
            resource: Value::Null,
            headers: base_headers(5.0),
        })
    }

    async fn execute_stored_procedure(
        &self,
        link: &ResourceLink,
        params: Vec<Value>,
        options: &RequestOptions,
    ) -> Result<ResourceResponse, FeedError> {
        self.begin_request().await?;
        log_request("execute", link, options);

        if link.is_feed() || link.kind() != Some(ResourceType::StoredProcedure) {
            return Err(FeedError::bad_request(format!(
                "'{link}' is not a stored procedure link"
            )));
        }
        if self.store.read().await.get(link).is_none() {
            return Err(FeedError::not_found(format!(
                "Stored procedure '{link}' not found"
            )));
        }

        let charge = 3.0 + params.len() as f64;
        Ok(ResourceResponse {
            resource: Value::Array(params),
            headers: base_headers(charge),
        })
    }

    async fn read_offer_for(
        &self,
        resource: &ResourceLink,
    ) -> Result<Option<ResourceResponse>, FeedError> {
        self.begin_request().await?;
        let store = self.store.read().await;
        Ok(store
            .offer_for(resource)
            .map(|offer| resource_response(offer.clone(), 1.0)))
    }
}

fn log_request(operation: &str, link: &ResourceLink, options: &RequestOptions) {
    debug!(
        operation,
        link = %link,
        indexing_directive = ?options.indexing_directive,
        consistency_level = ?options.consistency_level,
        pre_triggers = ?options.pre_trigger_include,
        post_triggers = ?options.post_trigger_include,
        offer_type = ?options.offer_type,
        "Resource request options"
    );
}

fn check_precondition(
    store: &MemoryStore,
    link: &ResourceLink,
    options: &RequestOptions,
) -> Result<(), FeedError> {
    if let Some(condition) = &options.access_condition
        && let Some(current) = store.get(link)
        && !condition.is_met(resource_etag(current))
    {
        return Err(FeedError::precondition_failed(format!(
            "Access condition on '{link}' was not met"
        )));
    }
    Ok(())
}

fn encode_continuation(feed_link: &ResourceLink, offset: usize) -> String {
    format!("{feed_link}#{offset}")
}

fn decode_continuation(feed_link: &ResourceLink, token: &str) -> Result<usize, FeedError> {
    let (link, offset) = token
        .rsplit_once('#')
        .ok_or_else(|| FeedError::InvalidContinuation(token.to_string()))?;
    if link != feed_link.as_str() {
        return Err(FeedError::InvalidContinuation(format!(
            "token '{token}' was issued for another feed"
        )));
    }
    offset
        .parse()
        .map_err(|_| FeedError::InvalidContinuation(token.to_string()))
}

fn base_headers(charge: f64) -> ResponseHeaders {
    let mut headers = ResponseHeaders::new();
    headers.insert(HEADER_REQUEST_CHARGE.to_string(), format!("{charge:.2}"));
    headers.insert(
        HEADER_ACTIVITY_ID.to_string(),
        uuid::Uuid::new_v4().to_string(),
    );
    headers
}

fn resource_response(resource: Value, charge: f64) -> ResourceResponse {
    let mut headers = base_headers(charge);
    if let Some(etag) = resource_etag(&resource) {
        headers.insert(HEADER_ETAG.to_string(), etag.to_string());
    }
    ResourceResponse { resource, headers }
}
