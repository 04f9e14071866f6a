pub mod kind;
pub mod link;
pub mod node;
