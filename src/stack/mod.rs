pub mod order;
pub mod registry;
pub mod resolver;
pub mod rotation;
