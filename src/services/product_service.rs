//! Product service for business logic operations.
//!
//! A stateless facade over [`ProductRepository`]: one logical write per
//! mutating call, results shaped for the HTTP layer.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::AppResult;
use crate::models::{NewProduct, Product, UpdateProduct};
use crate::repositories::ProductRepository;

/// Outcome of [`ProductService::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted: bool,
}

/// Product service for handling product-related business logic.
///
/// Cloning only bumps the repository's reference count.
#[derive(Clone)]
pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }

    /// Creates a new product.
    ///
    /// No duplicate detection is performed; an omitted image stays absent.
    ///
    /// # Returns
    /// The persisted product with its assigned id
    pub async fn create(&self, new_product: NewProduct) -> AppResult<Product> {
        let product = self.repo.create(new_product).await?;
        info!(product_id = product.id, "Product created");
        Ok(product)
    }

    /// Lists every product in insertion order.
    pub async fn find_all(&self) -> AppResult<Vec<Product>> {
        let products = self.repo.list_all().await?;
        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// # Returns
    /// `Some(Product)` if found, `None` otherwise
    pub async fn find_one(&self, id: i32) -> AppResult<Option<Product>> {
        let product = self.repo.find_by_id(id).await?;
        debug!(product_id = id, found = product.is_some(), "Looked up product");
        Ok(product)
    }

    /// Applies `changes` and returns the product as it reads afterwards.
    ///
    /// The write and the re-read are two separate statements without a
    /// transaction, so a concurrent writer may change or delete the row in
    /// between; the re-read result is returned as-is.
    ///
    /// # Returns
    /// `None` when no product has this id
    pub async fn update(&self, id: i32, changes: UpdateProduct) -> AppResult<Option<Product>> {
        let affected = self.repo.update(id, changes).await?;
        debug!(product_id = id, affected, "Product update written");

        let product = self.repo.find_by_id(id).await?;
        if product.is_some() {
            info!(product_id = id, "Product updated");
        }
        Ok(product)
    }

    /// Deletes a product; reports success whether or not it existed.
    pub async fn remove(&self, id: i32) -> AppResult<DeleteResult> {
        let affected = self.repo.delete(id).await?;
        info!(product_id = id, affected, "Product removed");
        Ok(DeleteResult { deleted: true })
    }
}
