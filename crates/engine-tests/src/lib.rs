#![allow(dead_code)]

use connectors::memory::client::MemoryFeedClient;
use engine_core::{pagination::controller::PaginationController, sink::RecordingSink};
use model::resource::link::ResourceLink;
use std::sync::Arc;

pub mod engine;
pub mod integration;
pub mod utils;

/// Feed of the ten-document `orders` collection in [`utils::ACCOUNT_SEED`].
pub const ORDERS_FEED: &str = "dbs/shop/colls/orders/docs";

pub fn memory_client() -> Arc<MemoryFeedClient> {
    Arc::new(MemoryFeedClient::from_seed_json(utils::ACCOUNT_SEED).expect("seed account"))
}

/// Controller over `feed` of a fresh seeded account, reporting to a recording sink.
pub fn controller_for(
    feed: &str,
) -> (PaginationController, Arc<MemoryFeedClient>, Arc<RecordingSink>) {
    let client = memory_client();
    let sink = Arc::new(RecordingSink::new());
    let link: ResourceLink = feed.parse().expect("feed link");
    let controller =
        PaginationController::new(client.clone(), sink.clone(), link).expect("controller");
    (controller, client, sink)
}
