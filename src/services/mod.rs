//! Service layer for business logic operations.

mod product_service;

pub use product_service::{DeleteResult, ProductService};

use std::sync::Arc;

use crate::repositories::ProductRepository;

/// Aggregates all services; held in the Axum application state.
#[derive(Clone)]
pub struct Services {
    pub products: ProductService,
}

impl Services {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self {
            products: ProductService::new(products),
        }
    }
}
