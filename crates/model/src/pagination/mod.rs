pub mod context;
pub mod continuation;
pub mod page;
