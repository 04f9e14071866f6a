use crate::{
    error::FeedError,
    feed::response::{FeedResponse, ResourceResponse},
};
use async_trait::async_trait;
use model::{
    options::{feed::FeedOptions, request::RequestOptions},
    resource::link::ResourceLink,
};
use serde_json::Value;

/// Feed side of the database client: paged queries and feed reads.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Runs `query_text` against the feed at `feed_link` and returns one page.
    async fn execute_query(
        &self,
        feed_link: &ResourceLink,
        query_text: &str,
        options: &FeedOptions,
    ) -> Result<FeedResponse, FeedError>;

    /// Reads one page of the feed at `feed_link` without a query.
    async fn read_feed(
        &self,
        feed_link: &ResourceLink,
        options: &FeedOptions,
    ) -> Result<FeedResponse, FeedError>;
}

/// Single-resource side of the database client.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn create(
        &self,
        feed_link: &ResourceLink,
        body: Value,
        options: &RequestOptions,
    ) -> Result<ResourceResponse, FeedError>;

    async fn read(
        &self,
        link: &ResourceLink,
        options: &RequestOptions,
    ) -> Result<ResourceResponse, FeedError>;

    async fn replace(
        &self,
        link: &ResourceLink,
        body: Value,
        options: &RequestOptions,
    ) -> Result<ResourceResponse, FeedError>;

    async fn delete(
        &self,
        link: &ResourceLink,
        options: &RequestOptions,
    ) -> Result<ResourceResponse, FeedError>;

    /// Runs the stored procedure at `link` with positional `params`. The
    /// response resource is whatever the procedure returned.
    async fn execute_stored_procedure(
        &self,
        link: &ResourceLink,
        params: Vec<Value>,
        options: &RequestOptions,
    ) -> Result<ResourceResponse, FeedError>;

    /// Offer attached to the resource at `resource`, if the account has one.
    async fn read_offer_for(
        &self,
        resource: &ResourceLink,
    ) -> Result<Option<ResourceResponse>, FeedError>;
}
