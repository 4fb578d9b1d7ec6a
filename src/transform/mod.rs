pub mod builders;
pub mod command;
pub mod view;
