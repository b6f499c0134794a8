//! Command handlers for CLI operations

pub mod migrate;
pub mod serve;

pub use migrate::{MigrateAction, MigrateCommandHandler};
pub use serve::{ServeCommandHandler, Storage};
