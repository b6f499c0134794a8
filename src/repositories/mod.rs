//! Repository layer for product persistence.
//!
//! [`ProductRepository`] is the seam between the service and storage; the
//! PostgreSQL and in-memory implementations behave identically.

mod memory_repo;
mod product_repo;

pub use memory_repo::InMemoryProductRepository;
pub use product_repo::PgProductRepository;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{NewProduct, Product, UpdateProduct};

/// Single-entity persistence operations for products.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Inserts a product and returns it with its assigned id.
    async fn create(&self, new_product: NewProduct) -> Result<Product, AppError>;

    /// Every stored product, ordered by ascending id.
    async fn list_all(&self) -> Result<Vec<Product>, AppError>;

    /// `None` when no product has this id.
    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, AppError>;

    /// Writes the supplied fields and returns the number of affected rows.
    ///
    /// An empty changeset touches nothing and reports 0.
    async fn update(&self, id: i32, changes: UpdateProduct) -> Result<usize, AppError>;

    /// Returns the number of deleted rows (0 or 1).
    async fn delete(&self, id: i32) -> Result<usize, AppError>;
}
