//! Product DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{NewProduct, Product, UpdateProduct};
use crate::services::DeleteResult;

/// Request body for creating a product.
///
/// Unknown fields are rejected.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[schema(example = json!({
    "name": "Product A",
    "description": "Description A",
    "price": 100,
    "imageUrl": "http://example.com/a.jpg"
}))]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "name should not be empty"))]
    pub name: String,
    /// May be empty
    pub description: String,
    pub price: f64,
    pub image_url: Option<String>,
}

impl CreateProductRequest {
    pub fn into_new_product(self) -> NewProduct {
        NewProduct {
            name: self.name,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
        }
    }
}

/// Request body for updating a product; only supplied fields are written.
///
/// `imageUrl: null` is treated like an omitted field, so an image cannot be
/// cleared through this request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, message = "name should not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
}

impl UpdateProductRequest {
    pub fn into_update_product(self) -> UpdateProduct {
        UpdateProduct {
            name: self.name,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
        }
    }
}

/// Product as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Product A")]
    pub name: String,
    #[schema(example = "Description A")]
    pub description: String,
    #[schema(example = 100.0)]
    pub price: f64,
    /// Omitted when the product has no image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            image_url: product.image_url,
        }
    }
}

/// Confirmation returned by DELETE; `deleted` is always true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    #[schema(example = true)]
    pub deleted: bool,
}

impl From<DeleteResult> for DeleteResponse {
    fn from(result: DeleteResult) -> Self {
        Self {
            deleted: result.deleted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_reads_camel_case_image_url() {
        let request: CreateProductRequest = serde_json::from_value(json!({
            "name": "Product A",
            "description": "Description A",
            "price": 100,
            "imageUrl": "http://example.com/a.jpg"
        }))
        .unwrap();

        assert_eq!(request.price, 100.0);
        assert_eq!(
            request.into_new_product().image_url.as_deref(),
            Some("http://example.com/a.jpg")
        );
    }

    #[test]
    fn test_create_request_rejects_snake_case_and_extra_fields() {
        let snake = serde_json::from_value::<CreateProductRequest>(json!({
            "name": "A", "description": "", "price": 1, "image_url": "x"
        }));
        assert!(snake.is_err());

        let extra = serde_json::from_value::<CreateProductRequest>(json!({
            "name": "A", "description": "", "price": 1, "color": "red"
        }));
        assert!(extra.is_err());
    }

    #[test]
    fn test_update_request_validates_present_name_only() {
        assert!(UpdateProductRequest::default().validate().is_ok());

        let empty_name = UpdateProductRequest {
            name: Some(String::new()),
            ..UpdateProductRequest::default()
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_product_response_omits_absent_image() {
        let response = ProductResponse::from(Product {
            id: 1,
            name: "Product A".to_string(),
            description: "Description A".to_string(),
            price: 100.0,
            image_url: None,
        });

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "id": 1,
                "name": "Product A",
                "description": "Description A",
                "price": 100.0
            })
        );
    }
}
