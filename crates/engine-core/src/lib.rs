pub mod commands;
pub mod error;
pub mod pagination;
pub mod perf;
pub mod render;
pub mod sink;
pub mod tree;
