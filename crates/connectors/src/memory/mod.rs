pub mod client;
pub mod query;
pub mod seed;
pub mod store;
