use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

/// Entity name carried by alert headers and `entityName` in error bodies
pub const ENTITY_NAME: &str = "products";

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("A new product cannot already have an ID")]
    IdExists,

    #[error("Invalid id")]
    IdNull,

    #[error("Invalid ID")]
    IdInvalid,

    #[error("Entity not found")]
    IdNotFound,

    #[error("Product {0} not found")]
    NotFound(i64),

    #[error("Product with name '{0}' already exists")]
    DuplicateName(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl ProductError {
    /// Stable key clients can match on; `None` for errors without one.
    pub fn error_key(&self) -> Option<&'static str> {
        match self {
            ProductError::IdExists => Some("idexists"),
            ProductError::IdNull => Some("idnull"),
            ProductError::IdInvalid => Some("idinvalid"),
            ProductError::IdNotFound => Some("idnotfound"),
            ProductError::InvalidFilter(_) => Some("invalidfilter"),
            _ => None,
        }
    }
}

pub type ProductResult<T> = Result<T, ProductError>;

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        if let Some(key) = err.error_key() {
            return AppError::bad_request_alert(err.to_string(), ENTITY_NAME, key);
        }

        match err {
            ProductError::NotFound(id) => AppError::NotFound(format!("Product {} not found", id)),
            ProductError::DuplicateName(name) => {
                AppError::Conflict(format!("Product with name '{}' already exists", name))
            }
            ProductError::Validation(msg) => AppError::BadRequest(msg),
            ProductError::Database(e) => AppError::Database(e),
            other => AppError::InternalServerError(other.to_string()),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_id_errors_become_alert_bad_requests() {
        let (status, body) = AppError::from(ProductError::IdNotFound).to_parts();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "Entity not found");
        assert_eq!(body.entity_name.as_deref(), Some("products"));
        assert_eq!(body.error_key.as_deref(), Some("idnotfound"));
    }

    #[test]
    fn test_invalid_filter_carries_its_key() {
        let (status, body) =
            AppError::from(ProductError::InvalidFilter("bad".into())).to_parts();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error_key.as_deref(), Some("invalidfilter"));
    }

    #[test]
    fn test_status_mapping() {
        let status = |err: ProductError| AppError::from(err).to_parts().0;

        assert_eq!(status(ProductError::NotFound(1)), StatusCode::NOT_FOUND);
        assert_eq!(
            status(ProductError::DuplicateName("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(ProductError::Validation("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(ProductError::Database(sea_orm::DbErr::Custom("down".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_database_errors_hide_driver_detail() {
        let (status, body) =
            AppError::from(ProductError::Database(sea_orm::DbErr::Custom("password=hunter2".into())))
                .to_parts();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "DATABASE_UNHANDLED");
        assert!(!body.message.contains("hunter2"));
    }
}
