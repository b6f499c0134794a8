//! Error handler for converting AppError to HTTP responses.
//!
//! Every error leaving the API is a JSON [`ErrorResponse`]; server-side
//! failures are logged and their sources never reach the client.

use axum::{
    Json,
    body::{Body, to_bytes},
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

use super::RequestId;
use crate::api::dto::ErrorResponse;
use crate::error::AppError;

/// Upper bound when re-reading an error body; error bodies are small.
const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

impl AppError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Validation { .. }
            | AppError::ValidationErrors { .. }
            | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::ConnectionPool { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database { .. }
            | AppError::Configuration { .. }
            | AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code placed in [`ErrorResponse::code`].
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Validation { .. } | AppError::ValidationErrors { .. } => "VALIDATION_ERROR",
            AppError::BadRequest { .. } => "BAD_REQUEST",
            AppError::Database { .. } => "DATABASE_ERROR",
            AppError::Configuration { .. } => "CONFIGURATION_ERROR",
            AppError::ConnectionPool { .. } => "SERVICE_UNAVAILABLE",
            AppError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Client-facing body; sources of server errors are left out.
    pub fn to_error_response(&self) -> ErrorResponse {
        let code = self.error_code();
        match self {
            AppError::NotFound {
                entity,
                field,
                value,
            } => ErrorResponse::new(code, self.to_string()).with_details(json!({
                "entity": entity,
                "field": field,
                "value": value,
            })),
            AppError::Validation { field, reason } => {
                ErrorResponse::new(code, self.to_string()).with_details(json!([{
                    "field": field,
                    "message": reason,
                }]))
            }
            AppError::ValidationErrors { errors } => {
                ErrorResponse::new(code, "Validation failed").with_details(json!(errors))
            }
            AppError::BadRequest { message } => ErrorResponse::new(code, message.clone()),
            AppError::Database { operation, .. } => {
                ErrorResponse::new(code, format!("Database operation failed: {}", operation))
            }
            AppError::Configuration { key, .. } => {
                ErrorResponse::new(code, format!("Configuration error: {}", key))
            }
            AppError::ConnectionPool { .. } => {
                ErrorResponse::new(code, "Database connection unavailable")
            }
            AppError::Internal { .. } => ErrorResponse::new(code, "An internal error occurred"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = ?self, "Request failed");
        } else {
            warn!(error = %self, "Request rejected");
        }

        (status, Json(self.to_error_response())).into_response()
    }
}

/// Normalizes every error response to the [`ErrorResponse`] shape.
///
/// Plain-text rejections produced by axum itself (bad path parameters,
/// unknown routes, wrong methods) are wrapped, and the request ID is
/// attached to all error bodies.
pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let request_id = request.extensions().get::<RequestId>().map(|id| id.0.clone());
    let response = next.run(request).await;

    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = to_bytes(body, MAX_ERROR_BODY_BYTES)
        .await
        .unwrap_or_default();

    let is_json = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    let mut error_response = match serde_json::from_slice::<ErrorResponse>(&bytes) {
        Ok(parsed) if is_json => parsed,
        // Other JSON bodies, such as a failing health report, pass through
        Err(_) if is_json => return Response::from_parts(parts, Body::from(bytes)),
        _ => fallback_error_response(status, String::from_utf8_lossy(&bytes).trim()),
    };

    if let Some(id) = request_id.as_deref() {
        error_response = error_response.with_request_id(id);
    }

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.remove(header::CONTENT_TYPE);
    let mut rebuilt = Json(error_response).into_response();
    *rebuilt.status_mut() = status;
    for (name, value) in parts.headers.iter() {
        rebuilt.headers_mut().insert(name.clone(), value.clone());
    }
    rebuilt
}

fn fallback_error_response(status: StatusCode, original: &str) -> ErrorResponse {
    let (code, default_message) = match status {
        StatusCode::BAD_REQUEST => ("BAD_REQUEST", "Bad request - invalid or malformed request"),
        StatusCode::NOT_FOUND => ("NOT_FOUND", "The requested resource was not found"),
        StatusCode::METHOD_NOT_ALLOWED => {
            ("METHOD_NOT_ALLOWED", "HTTP method not allowed for this endpoint")
        }
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ("UNSUPPORTED_MEDIA_TYPE", "Unsupported media type"),
        StatusCode::PAYLOAD_TOO_LARGE => ("PAYLOAD_TOO_LARGE", "Request payload too large"),
        StatusCode::REQUEST_TIMEOUT => ("REQUEST_TIMEOUT", "Request timeout"),
        StatusCode::SERVICE_UNAVAILABLE => {
            ("SERVICE_UNAVAILABLE", "Service temporarily unavailable")
        }
        s if s.is_server_error() => ("INTERNAL_ERROR", "An internal server error occurred"),
        _ => ("UNKNOWN_ERROR", "An unknown error occurred"),
    };

    // Server error text may carry internals
    let message = if original.is_empty() || status.is_server_error() {
        default_message.to_string()
    } else {
        original.to_string()
    };
    ErrorResponse::new(code, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationFieldError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_and_code_mapping() {
        let cases = [
            (AppError::product_not_found(1), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                AppError::Validation {
                    field: "name".into(),
                    reason: "missing".into(),
                },
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                AppError::ValidationErrors { errors: vec![] },
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                AppError::BadRequest {
                    message: "x".into(),
                },
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
            ),
            (
                AppError::Database {
                    operation: "insert product".into(),
                    source: anyhow::anyhow!("boom"),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
            ),
            (
                AppError::ConnectionPool {
                    source: anyhow::anyhow!("timeout"),
                },
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
            ),
            (
                AppError::Internal {
                    source: anyhow::anyhow!("boom"),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];

        for (error, status, code) in cases {
            assert_eq!(error.status_code(), status, "{error:?}");
            assert_eq!(error.error_code(), code, "{error:?}");
        }
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let response = AppError::product_not_found(42).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["details"]["entity"], "product");
        assert_eq!(body["details"]["value"], "42");
    }

    #[tokio::test]
    async fn test_validation_errors_list_fields() {
        let response = AppError::ValidationErrors {
            errors: vec![ValidationFieldError {
                field: "name".into(),
                message: "name should not be empty".into(),
            }],
        }
        .into_response();

        let body = body_json(response).await;
        assert_eq!(body["details"][0]["field"], "name");
        assert_eq!(body["details"][0]["message"], "name should not be empty");
    }

    #[tokio::test]
    async fn test_internal_error_hides_source() {
        let response = AppError::Database {
            operation: "select products".into(),
            source: anyhow::anyhow!("password=hunter2"),
        }
        .into_response();

        let body = body_json(response).await.to_string();
        assert!(!body.contains("hunter2"));
        assert!(body.contains("select products"));
    }

    #[test]
    fn test_fallback_keeps_client_text_but_hides_server_text() {
        let client = fallback_error_response(StatusCode::BAD_REQUEST, "Invalid URL: bad id");
        assert_eq!(client.code, "BAD_REQUEST");
        assert_eq!(client.message, "Invalid URL: bad id");

        let server = fallback_error_response(StatusCode::INTERNAL_SERVER_ERROR, "stack trace");
        assert_eq!(server.message, "An internal server error occurred");

        let empty = fallback_error_response(StatusCode::NOT_FOUND, "");
        assert_eq!(empty.message, "The requested resource was not found");
    }
}
