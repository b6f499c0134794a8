use std::sync::OnceLock;

use axum::Json;
use axum::extract::{FromRequest, Request};
use regex::Regex;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Field reported when serde does not name one.
const BODY_FIELD: &str = "body";

/// Deserializes `payload` into `T` and runs its `Validate` rules.
///
/// Shape problems (missing field, wrong type, unknown field) become
/// [`AppError::Validation`] naming the offending field when serde reports
/// it; rule violations become [`AppError::ValidationErrors`].
pub fn parse_payload<T>(payload: serde_json::Value) -> AppResult<T>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_value(payload).map_err(|e| {
        let reason = e.to_string();
        AppError::Validation {
            field: field_from_serde_message(&reason).unwrap_or_else(|| BODY_FIELD.to_string()),
            reason,
        }
    })?;
    value.validate()?;
    Ok(value)
}

/// Pulls `x` out of messages like "missing field `x`" or "unknown field `x`, expected ...".
fn field_from_serde_message(message: &str) -> Option<String> {
    static FIELD: OnceLock<Option<Regex>> = OnceLock::new();
    FIELD
        .get_or_init(|| Regex::new(r"field `([^`]+)`").ok())
        .as_ref()?
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// JSON body extractor that rejects invalid payloads before the handler runs.
///
/// A body that is not JSON at all (bad syntax, wrong content type) is a
/// [`AppError::BadRequest`]; everything else goes through [`parse_payload`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let Json(payload) = Json::<serde_json::Value>::from_request(req, state).await?;
        parse_payload(payload).map(ValidatedJson)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::{CreateProductRequest, UpdateProductRequest};
    use axum::body::Body;
    use axum::http::{Method, header};
    use serde_json::json;

    fn json_request(content_type: &str, body: &str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/products")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn validation_field(result: AppResult<CreateProductRequest>) -> String {
        match result {
            Err(AppError::Validation { field, .. }) => field,
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_payload_accepts_valid_create() {
        let dto: CreateProductRequest = parse_payload(json!({
            "name": "Product A",
            "description": "Description A",
            "price": 100
        }))
        .unwrap();

        assert_eq!(dto.name, "Product A");
        assert!(dto.image_url.is_none());
    }

    #[test]
    fn test_missing_required_field_is_named() {
        let result = parse_payload(json!({"name": "A", "price": 1}));
        assert_eq!(validation_field(result), "description");
    }

    #[test]
    fn test_unknown_field_is_named() {
        let result = parse_payload(json!({
            "name": "A", "description": "d", "price": 1, "discount": 5
        }));
        assert_eq!(validation_field(result), "discount");
    }

    #[test]
    fn test_wrong_type_falls_back_to_body() {
        let result = parse_payload::<CreateProductRequest>(json!({
            "name": "A", "description": "d", "price": "cheap"
        }));
        match result {
            Err(AppError::Validation { field, reason }) => {
                assert_eq!(field, "body");
                assert!(reason.contains("invalid type"));
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_name_fails_rules() {
        let result = parse_payload::<CreateProductRequest>(json!({
            "name": "", "description": "d", "price": 1
        }));
        match result {
            Err(AppError::ValidationErrors { errors }) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "name");
            }
            other => panic!("Expected ValidationErrors, got {:?}", other),
        }
    }

    #[test]
    fn test_update_payload_may_be_empty() {
        let dto: UpdateProductRequest = parse_payload(json!({})).unwrap();
        assert_eq!(dto, UpdateProductRequest::default());
    }

    #[tokio::test]
    async fn test_extractor_accepts_valid_body() {
        let request = json_request(
            "application/json",
            r#"{"name":"A","description":"","price":2.5,"imageUrl":"http://x.com/a.jpg"}"#,
        );
        let ValidatedJson(dto) = ValidatedJson::<CreateProductRequest>::from_request(request, &())
            .await
            .unwrap();

        assert_eq!(dto.price, 2.5);
        assert_eq!(dto.image_url.as_deref(), Some("http://x.com/a.jpg"));
    }

    #[tokio::test]
    async fn test_extractor_syntax_error_is_bad_request() {
        let request = json_request("application/json", r#"{"name": "A""#);
        let result = ValidatedJson::<CreateProductRequest>::from_request(request, &()).await;
        assert!(matches!(result, Err(AppError::BadRequest { .. })));
    }

    #[tokio::test]
    async fn test_extractor_wrong_content_type_is_bad_request() {
        let request = json_request("text/plain", r#"{"name":"A","description":"","price":1}"#);
        let result = ValidatedJson::<CreateProductRequest>::from_request(request, &()).await;
        assert!(matches!(result, Err(AppError::BadRequest { .. })));
    }

    #[tokio::test]
    async fn test_extractor_reports_validation_errors() {
        let request = json_request("application/json", r#"{"name":"A","price":1}"#);
        let result = ValidatedJson::<CreateProductRequest>::from_request(request, &()).await;
        assert!(matches!(
            result,
            Err(AppError::Validation { ref field, .. }) if field == "description"
        ));
    }
}
