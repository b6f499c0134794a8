//! Data Transfer Objects for API requests and responses.

mod error;
mod health;
mod product;

pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use product::{CreateProductRequest, DeleteResponse, ProductResponse, UpdateProductRequest};
