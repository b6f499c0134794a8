//! Process-local product store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::models::{NewProduct, Product, UpdateProduct};
use crate::repositories::ProductRepository;

/// Keeps products in a `BTreeMap` keyed by id.
///
/// Ids start at 1 and are never reused, even after a delete, matching a
/// `SERIAL` column.
#[derive(Debug)]
pub struct InMemoryProductRepository {
    products: RwLock<BTreeMap<i32, Product>>,
    next_id: AtomicI32,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            products: RwLock::new(BTreeMap::new()),
            next_id: AtomicI32::new(1),
        }
    }
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, new_product: NewProduct) -> Result<Product, AppError> {
        let mut products = self.products.write().await;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let product = new_product.into_product(id);
        products.insert(id, product.clone());
        Ok(product)
    }

    async fn list_all(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.products.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, AppError> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn update(&self, id: i32, changes: UpdateProduct) -> Result<usize, AppError> {
        if changes.is_empty() {
            return Ok(0);
        }

        let mut products = self.products.write().await;
        match products.get_mut(&id) {
            Some(product) => {
                changes.apply_to(product);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: i32) -> Result<usize, AppError> {
        Ok(usize::from(self.products.write().await.remove(&id).is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(name: &str, price: f64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: format!("{name} description"),
            price,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_ids_are_sequential_and_never_reused() {
        let repo = InMemoryProductRepository::new();
        let first = repo.create(new_product("A", 1.0)).await.unwrap();
        let second = repo.create(new_product("B", 2.0)).await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        assert_eq!(repo.delete(second.id).await.unwrap(), 1);
        let third = repo.create(new_product("C", 3.0)).await.unwrap();
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn test_list_all_is_in_id_order() {
        let repo = InMemoryProductRepository::new();
        for (name, price) in [("A", 3.0), ("B", 1.0), ("C", 2.0)] {
            repo.create(new_product(name, price)).await.unwrap();
        }

        let names: Vec<String> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_update_reports_affected_rows() {
        let repo = InMemoryProductRepository::new();
        let created = repo.create(new_product("A", 1.0)).await.unwrap();

        let changes = UpdateProduct {
            price: Some(9.5),
            ..UpdateProduct::default()
        };
        assert_eq!(repo.update(created.id, changes.clone()).await.unwrap(), 1);
        assert_eq!(repo.update(999, changes).await.unwrap(), 0);
        assert_eq!(
            repo.update(created.id, UpdateProduct::default()).await.unwrap(),
            0
        );

        let stored = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.price, 9.5);
        assert_eq!(stored.name, "A");
    }

    #[tokio::test]
    async fn test_delete_missing_is_zero() {
        let repo = InMemoryProductRepository::new();
        assert_eq!(repo.delete(42).await.unwrap(), 0);
        assert!(repo.find_by_id(42).await.unwrap().is_none());
    }
}
