//! Router configuration for the API.

use std::time::Duration;

use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{global_error_handler, logging_middleware, request_id_middleware};
use crate::state::AppState;

/// Path of the generated OpenAPI document.
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Middleware is applied in reverse order of declaration (last added runs first):
/// 1. CORS and compression
/// 2. Request ID - generates/propagates request IDs
/// 3. Logging - logs requests with request IDs
/// 4. Error handler - normalizes error bodies and attaches the request ID
/// 5. Timeout - answers 408 once `request_timeout` elapses
///
/// # Routes
/// - `/api/products` - Product CRUD operations
/// - `/health`, `/health/ready`, `/health/live` - Probes
/// - `/swagger-ui` - Interactive documentation for [`OPENAPI_JSON_PATH`]
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api/products", handlers::products::product_routes())
        .merge(handlers::health::health_routes())
        .split_for_parts();

    let router = router.merge(SwaggerUi::new("/swagger-ui").url(OPENAPI_JSON_PATH, api));
    with_middleware(router, request_timeout).with_state(state)
}

fn with_middleware(router: Router<AppState>, request_timeout: Duration) -> Router<AppState> {
    router
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
