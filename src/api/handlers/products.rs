//! Product CRUD request handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::PRODUCT_TAG;
use crate::api::dto::{
    CreateProductRequest, DeleteResponse, ErrorResponse, ProductResponse, UpdateProductRequest,
};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Creates product routes, mounted under `/api/products`.
///
/// Routes:
/// - GET /          - List all products
/// - POST /         - Create a product
/// - GET /{id}      - Get product by ID
/// - PUT /{id}      - Update product by ID
/// - PATCH /{id}    - Same as PUT
/// - DELETE /{id}   - Delete product by ID
pub fn product_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_products, create_product))
        .routes(routes!(
            get_product,
            update_product,
            patch_product,
            delete_product
        ))
}

/// POST /api/products - Create a product
#[utoipa::path(
    post,
    path = "/",
    tag = PRODUCT_TAG,
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse)
    )
)]
async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    let product = state.services.products.create(req.into_new_product()).await?;
    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

/// GET /api/products - List all products
#[utoipa::path(
    get,
    path = "/",
    tag = PRODUCT_TAG,
    responses(
        (status = 200, description = "All products ordered by id", body = Vec<ProductResponse>)
    )
)]
async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<ProductResponse>>> {
    let products = state.services.products.find_all().await?;
    Ok(Json(
        products.into_iter().map(ProductResponse::from).collect(),
    ))
}

/// GET /api/products/{id} - Get product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = PRODUCT_TAG,
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 400, description = "Id is not an integer", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ProductResponse>> {
    state
        .services
        .products
        .find_one(id)
        .await?
        .map(|product| Json(ProductResponse::from(product)))
        .ok_or_else(|| AppError::product_not_found(id))
}

/// PUT /api/products/{id} - Update product
///
/// Only the supplied fields change.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = PRODUCT_TAG,
    params(("id" = i32, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<UpdateProductRequest>,
) -> AppResult<Json<ProductResponse>> {
    apply_update(&state, id, req).await
}

/// PATCH /api/products/{id} - Update product
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = PRODUCT_TAG,
    params(("id" = i32, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
async fn patch_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<UpdateProductRequest>,
) -> AppResult<Json<ProductResponse>> {
    apply_update(&state, id, req).await
}

async fn apply_update(
    state: &AppState,
    id: i32,
    req: UpdateProductRequest,
) -> AppResult<Json<ProductResponse>> {
    state
        .services
        .products
        .update(id, req.into_update_product())
        .await?
        .map(|product| Json(ProductResponse::from(product)))
        .ok_or_else(|| AppError::product_not_found(id))
}

/// DELETE /api/products/{id} - Delete product
///
/// Succeeds whether or not the product existed.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = PRODUCT_TAG,
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted", body = DeleteResponse),
        (status = 400, description = "Id is not an integer", body = ErrorResponse)
    )
)]
async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<DeleteResponse>> {
    let result = state.services.products.remove(id).await?;
    Ok(Json(DeleteResponse::from(result)))
}
