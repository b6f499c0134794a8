//! Application state for Axum web framework.

use std::sync::Arc;

use crate::db::AsyncDbPool;
use crate::repositories::{InMemoryProductRepository, PgProductRepository, ProductRepository};
use crate::services::Services;

/// Shared state handed to every handler.
///
/// Cloning is cheap since services hold their repository behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Pool used for health probes; `None` when running on in-memory storage
    pub db_pool: Option<AsyncDbPool>,
}

impl AppState {
    /// State backed by PostgreSQL.
    pub fn new(pool: AsyncDbPool) -> Self {
        let repo = Arc::new(PgProductRepository::new(pool.clone()));
        Self::with_repository(repo, Some(pool))
    }

    /// State backed by a process-local store, lost on restart.
    pub fn in_memory() -> Self {
        Self::with_repository(Arc::new(InMemoryProductRepository::new()), None)
    }

    pub fn with_repository(repo: Arc<dyn ProductRepository>, db_pool: Option<AsyncDbPool>) -> Self {
        Self {
            services: Services::new(repo),
            db_pool,
        }
    }
}
