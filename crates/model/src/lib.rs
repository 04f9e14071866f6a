pub mod options;
pub mod pagination;
pub mod resource;
