//! Database access: connection pool and embedded migrations.

mod pool;

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub use pool::{AsyncDbPool, establish_async_connection_pool};

/// Migrations compiled into the binary from `migrations/`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
