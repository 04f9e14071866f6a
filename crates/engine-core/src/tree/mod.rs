pub mod menu;
pub mod node;
