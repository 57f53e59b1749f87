pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, RuntimeErr, SqlErr};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Body of every error response.
///
/// ```json
/// {
///   "code": 1012,
///   "error": "BAD_REQUEST",
///   "message": "A new product cannot already have an ID",
///   "entityName": "products",
///   "errorKey": "idexists"
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Structured details, e.g. per-field validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Entity the client error refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    /// Stable key for programmatic handling, e.g. `idnotfound`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_key: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
            entity_name: None,
            error_key: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_alert(mut self, entity_name: impl Into<String>, error_key: impl Into<String>) -> Self {
        self.entity_name = Some(entity_name.into());
        self.error_key = Some(error_key.into());
        self
    }
}

/// Application error type that can be converted to HTTP responses.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    /// Client error tied to an entity, rendered with `entityName`/`errorKey`
    #[error("Bad Request: {message} ({entity_name}.{error_key})")]
    BadRequestAlert {
        message: String,
        entity_name: String,
        error_key: String,
    },

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn bad_request_alert(
        message: impl Into<String>,
        entity_name: impl Into<String>,
        error_key: impl Into<String>,
    ) -> Self {
        Self::BadRequestAlert {
            message: message.into(),
            entity_name: entity_name.into(),
            error_key: error_key.into(),
        }
    }

    /// Status code and body for this error; logs at a level matching its severity.
    pub fn to_parts(self) -> (StatusCode, ErrorResponse) {
        match self {
            AppError::Database(e) => map_db_error(&e),
            AppError::JsonExtractorRejection(e) => {
                tracing::info!(error_code = ErrorCode::JsonExtraction.code(), "JSON extraction error: {}", e);
                // Wrong content type keeps its 415; every body problem is a plain 400
                let status = match &e {
                    JsonRejection::MissingJsonContentType(_) => e.status(),
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, ErrorResponse::new(ErrorCode::JsonExtraction, e.body_text()))
            }
            AppError::ValidationError(e) => {
                tracing::info!(error_code = ErrorCode::ValidationError.code(), "Validation error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(
                        ErrorCode::ValidationError,
                        ErrorCode::ValidationError.default_message(),
                    )
                    .with_details(validation_details(&e)),
                )
            }
            AppError::InvalidId(raw) => {
                tracing::info!(error_code = ErrorCode::InvalidId.code(), "Invalid id: {}", raw);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(ErrorCode::InvalidId, format!("Invalid id: {}", raw)),
                )
            }
            AppError::BadRequest(msg) => {
                tracing::info!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, ErrorResponse::new(ErrorCode::BadRequest, msg))
            }
            AppError::BadRequestAlert {
                message,
                entity_name,
                error_key,
            } => {
                tracing::info!(entity = %entity_name, error_key = %error_key, "Bad request: {}", message);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(ErrorCode::BadRequest, message).with_alert(entity_name, error_key),
                )
            }
            AppError::NotFound(msg) => {
                tracing::info!(error_code = ErrorCode::NotFound.code(), "Not found: {}", msg);
                (StatusCode::NOT_FOUND, ErrorResponse::new(ErrorCode::NotFound, msg))
            }
            AppError::Conflict(msg) => {
                tracing::info!("Conflict: {}", msg);
                (StatusCode::CONFLICT, ErrorResponse::new(ErrorCode::Conflict, msg))
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(error_code = ErrorCode::InternalError.code(), "Internal server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(ErrorCode::InternalError, msg),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.to_parts();
        (status, Json(body)).into_response()
    }
}

fn internal(code: ErrorCode) -> (StatusCode, ErrorResponse) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorResponse::new(code, code.default_message()),
    )
}

/// Maps SeaORM errors to a status; driver details stay in the logs.
fn map_db_error(error: &DbErr) -> (StatusCode, ErrorResponse) {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = error.sql_err() {
        tracing::info!(error_code = ErrorCode::Conflict.code(), "Unique constraint violated: {}", detail);
        return (
            StatusCode::CONFLICT,
            ErrorResponse::new(ErrorCode::Conflict, ErrorCode::Conflict.default_message()),
        );
    }

    match error {
        DbErr::RecordNotFound(what) => {
            tracing::info!(error_code = ErrorCode::DatabaseNotFound.code(), "Record not found: {}", what);
            (
                StatusCode::NOT_FOUND,
                ErrorResponse::new(
                    ErrorCode::DatabaseNotFound,
                    ErrorCode::DatabaseNotFound.default_message(),
                ),
            )
        }
        DbErr::ConnectionAcquire(e) => {
            tracing::warn!(error_code = ErrorCode::DatabasePoolTimeout.code(), "Connection acquire failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new(
                    ErrorCode::DatabasePoolTimeout,
                    ErrorCode::DatabasePoolTimeout.default_message(),
                ),
            )
        }
        DbErr::Migration(e) => {
            tracing::error!(error_code = ErrorCode::MigrationError.code(), "Migration error: {}", e);
            internal(ErrorCode::MigrationError)
        }
        DbErr::Conn(RuntimeErr::SqlxError(e))
        | DbErr::Exec(RuntimeErr::SqlxError(e))
        | DbErr::Query(RuntimeErr::SqlxError(e)) => {
            tracing::error!(error_code = ErrorCode::DatabaseError.code(), "Database error: {:?}", e);
            internal(ErrorCode::DatabaseError)
        }
        _ => {
            tracing::error!(error_code = ErrorCode::DatabaseUnhandled.code(), "Unhandled database error: {:?}", error);
            internal(ErrorCode::DatabaseUnhandled)
        }
    }
}

/// Per-field validation errors as `{ field: [{code, message, params}] }`.
pub fn validation_details(errors: &ValidationErrors) -> serde_json::Value {
    let fields = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let entries: Vec<serde_json::Value> = errors
                .iter()
                .map(|err| {
                    serde_json::json!({
                        "code": err.code,
                        "message": err.message,
                        "params": err.params,
                    })
                })
                .collect();
            (field.to_string(), serde_json::Value::Array(entries))
        })
        .collect::<serde_json::Map<_, _>>();

    serde_json::Value::Object(fields)
}

/// Build an error response from a status, message and code.
pub fn error_response(status: StatusCode, message: String, error_code: ErrorCode) -> Response {
    (status, Json(ErrorResponse::new(error_code, message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Named {
        #[validate(length(min = 1))]
        name: String,
    }

    #[test]
    fn test_bad_request_alert_carries_entity_and_key() {
        let (status, body) =
            AppError::bad_request_alert("Invalid ID", "products", "idnull").to_parts();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "BAD_REQUEST");
        assert_eq!(body.entity_name.as_deref(), Some("products"));
        assert_eq!(body.error_key.as_deref(), Some("idnull"));

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["entityName"], "products");
        assert_eq!(json["errorKey"], "idnull");
    }

    #[test]
    fn test_plain_errors_omit_alert_fields() {
        let (status, body) = AppError::NotFound("Product 7 not found".into()).to_parts();
        assert_eq!(status, StatusCode::NOT_FOUND);

        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("entityName").is_none());
        assert!(json.get("details").is_none());
        assert_eq!(json["code"], 1004);
    }

    #[test]
    fn test_validation_error_lists_fields() {
        let errors = Named {
            name: String::new(),
        }
        .validate()
        .unwrap_err();

        let (status, body) = AppError::from(errors).to_parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let details = body.details.unwrap();
        assert_eq!(details["name"][0]["code"], "length");
    }

    #[test]
    fn test_db_record_not_found_is_404() {
        let (status, body) = AppError::from(DbErr::RecordNotFound("products".into())).to_parts();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "DATABASE_NOT_FOUND");
    }

    #[test]
    fn test_db_custom_error_is_500_without_leaking_detail() {
        let (status, body) = AppError::from(DbErr::Custom("secret detail".into())).to_parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.message.contains("secret"));
    }
}
