use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use shared_types::ErrorResponse;
use tracing::error;

use crate::service::{ServiceError, ValidationError};
use crate::storage::StorageError;

pub const CONFIG_NAME_PATTERN: &str = "^[a-zA-Z0-9_-]+$";
pub const CONFIG_NAME_MAX_LEN: usize = 100;

pub const INVALID_REQUEST_FORMAT: &str = "INVALID_REQUEST_FORMAT";
pub const MISSING_REQUIRED_FIELD: &str = "MISSING_REQUIRED_FIELD";
pub const INVALID_CONFIG_NAME: &str = "INVALID_CONFIG_NAME";
pub const INVALID_VERSION_NUMBER: &str = "INVALID_VERSION_NUMBER";
pub const CONFIG_NOT_FOUND: &str = "CONFIG_NOT_FOUND";
pub const VERSION_NOT_FOUND: &str = "VERSION_NOT_FOUND";
pub const CONFIG_ALREADY_EXISTS: &str = "CONFIG_ALREADY_EXISTS";
pub const SCHEMA_VALIDATION_FAILED: &str = "SCHEMA_VALIDATION_FAILED";
pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";

#[derive(Debug)]
pub enum ApiError {
    MalformedRequestBody(String),
    MissingRequiredField {
        field: &'static str,
        required: &'static [&'static str],
    },
    InvalidConfigName(String),
    /// Raw text of the rejected version, as the client sent it.
    InvalidVersionNumber(String),
    Service(ServiceError),
}

struct ErrorParts {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<serde_json::Value>,
}

impl ErrorParts {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

fn malformed_body(reason: String) -> ErrorParts {
    ErrorParts::new(
        StatusCode::BAD_REQUEST,
        INVALID_REQUEST_FORMAT,
        "Request body must be valid JSON",
    )
    .with_details(json!({ "parse_error": reason }))
}

fn invalid_version(provided: serde_json::Value) -> ErrorParts {
    ErrorParts::new(
        StatusCode::BAD_REQUEST,
        INVALID_VERSION_NUMBER,
        "Version number must be positive integer",
    )
    .with_details(json!({ "provided_version": provided, "minimum_version": 1 }))
}

fn internal(err: &ServiceError) -> ErrorParts {
    error!("Unexpected failure: {err}");
    ErrorParts::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        INTERNAL_SERVER_ERROR,
        "An unexpected error occurred",
    )
}

fn service_error_parts(err: ServiceError) -> ErrorParts {
    let message = err.to_string();
    match err {
        ServiceError::Validation(ValidationError::SchemaValidationFailed(violations)) => {
            ErrorParts::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                SCHEMA_VALIDATION_FAILED,
                message,
            )
            .with_details(json!({ "validation_errors": violations }))
        }
        ServiceError::Validation(ValidationError::MalformedPayload(reason)) => {
            malformed_body(reason)
        }
        ServiceError::Storage(StorageError::AlreadyExists(_)) => {
            ErrorParts::new(StatusCode::CONFLICT, CONFIG_ALREADY_EXISTS, message)
        }
        ServiceError::Storage(StorageError::NotFound(_)) => {
            ErrorParts::new(StatusCode::NOT_FOUND, CONFIG_NOT_FOUND, message)
        }
        ServiceError::Storage(StorageError::VersionNotFound { .. }) => {
            ErrorParts::new(StatusCode::NOT_FOUND, VERSION_NOT_FOUND, message)
        }
        ServiceError::InvalidVersionNumber(version) => invalid_version(json!(version)),
        other => internal(&other),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let parts = match self {
            ApiError::MalformedRequestBody(reason) => malformed_body(reason),
            ApiError::MissingRequiredField { field, required } => ErrorParts::new(
                StatusCode::BAD_REQUEST,
                MISSING_REQUIRED_FIELD,
                format!("Missing required field: {field}"),
            )
            .with_details(json!({ "required_fields": required })),
            ApiError::InvalidConfigName(name) => ErrorParts::new(
                StatusCode::BAD_REQUEST,
                INVALID_CONFIG_NAME,
                "Configuration name contains invalid characters",
            )
            .with_details(json!({
                "provided_name": name,
                "allowed_pattern": CONFIG_NAME_PATTERN,
                "max_length": CONFIG_NAME_MAX_LEN,
            })),
            ApiError::InvalidVersionNumber(provided) => invalid_version(json!(provided)),
            ApiError::Service(err) => service_error_parts(err),
        };

        let body = Json(ErrorResponse::new(parts.code, parts.message, parts.details));
        (parts.status, body).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedRequestBody(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Names are 1 to 100 ASCII letters, digits, `_` or `-`.
pub fn is_valid_config_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= CONFIG_NAME_MAX_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use axum::body::to_bytes;
    use shared_types::FieldViolation;

    async fn error_body(error: ApiError) -> (StatusCode, ErrorResponse) {
        let response = error.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_config_not_found() {
        let error = ApiError::from(ServiceError::Storage(StorageError::NotFound(
            "app".to_string(),
        )));
        let (status, body) = error_body(error).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!body.success);
        assert_eq!(body.error.code, CONFIG_NOT_FOUND);
        assert!(body.error.message.contains("app"));
    }

    #[tokio::test]
    async fn test_version_not_found() {
        let error = ApiError::from(ServiceError::Storage(StorageError::VersionNotFound {
            name: "app".to_string(),
            version: 99,
        }));
        let (status, body) = error_body(error).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error.code, VERSION_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_already_exists() {
        let error = ApiError::from(ServiceError::Storage(StorageError::AlreadyExists(
            "app".to_string(),
        )));
        let (status, body) = error_body(error).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.error.code, CONFIG_ALREADY_EXISTS);
    }

    #[tokio::test]
    async fn test_schema_validation_failed_lists_violations() {
        let violations = vec![
            FieldViolation {
                field: "/".to_string(),
                error: "\"enabled\" is a required property".to_string(),
            },
            FieldViolation {
                field: "/max_limit".to_string(),
                error: "-1 is less than the minimum of 0".to_string(),
            },
        ];
        let error = ApiError::from(ServiceError::Validation(
            ValidationError::SchemaValidationFailed(violations),
        ));
        let (status, body) = error_body(error).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error.code, SCHEMA_VALIDATION_FAILED);
        let details = body.error.details.unwrap();
        assert_eq!(details["validation_errors"].as_array().unwrap().len(), 2);
        assert_eq!(details["validation_errors"][1]["field"], "/max_limit");
    }

    #[tokio::test]
    async fn test_invalid_version_number() {
        let (status, body) = error_body(ApiError::InvalidVersionNumber("abc".to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.code, INVALID_VERSION_NUMBER);
        assert_eq!(body.error.details.unwrap()["provided_version"], "abc");

        let (status, body) =
            error_body(ApiError::from(ServiceError::InvalidVersionNumber(0))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.details.unwrap()["provided_version"], 0);
    }

    #[tokio::test]
    async fn test_missing_required_field() {
        let error = ApiError::MissingRequiredField {
            field: "name",
            required: &["name", "data"],
        };
        let (status, body) = error_body(error).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.code, MISSING_REQUIRED_FIELD);
        assert_eq!(
            body.error.details.unwrap()["required_fields"],
            json!(["name", "data"])
        );
    }

    #[tokio::test]
    async fn test_internal_errors_are_not_leaked() {
        let error = ApiError::from(ServiceError::CorruptPayload {
            name: "app".to_string(),
            version: 1,
            reason: "secret detail".to_string(),
        });
        let (status, body) = error_body(error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, INTERNAL_SERVER_ERROR);
        assert!(!body.error.message.contains("secret"));

        let (status, _) =
            error_body(ApiError::from(ServiceError::Storage(StorageError::Closed))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_config_name_rules() {
        assert!(is_valid_config_name("app"));
        assert!(is_valid_config_name("feature-toggle_2"));
        assert!(!is_valid_config_name(""));
        assert!(!is_valid_config_name("has space"));
        assert!(!is_valid_config_name("slash/name"));
        assert!(!is_valid_config_name("ünïcode"));
        assert!(!is_valid_config_name(&"a".repeat(101)));
        assert!(is_valid_config_name(&"a".repeat(100)));
    }
}
