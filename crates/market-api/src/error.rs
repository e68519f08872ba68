//! Service errors and their HTTP mapping
//!
//! Storage failures are logged here and reduced to generic messages; raw
//! database errors never reach a response body.

use axum::{http::StatusCode, Json};
use market_db::DbError;
use thiserror::Error;
use tracing::{error, warn};

use crate::models::ErrorResponse;

/// Error returned from handlers
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Malformed or out-of-range input
    #[error("{0}")]
    Validation(String),

    /// Referenced entity is absent
    #[error("{0}")]
    NotFound(String),

    /// Missing, invalid or expired credential
    #[error("Unauthenticated")]
    Unauthenticated,

    /// Authenticated, but not the owner
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal,
}

impl ServiceError {
    /// Translate a storage error for `entity` ("Item", "Deal", ...)
    pub fn from_store(entity: &str, err: DbError) -> Self {
        match err {
            DbError::NotFound => ServiceError::NotFound(format!("{} not found", entity)),
            DbError::UniqueViolation(detail) => {
                warn!("{} unique constraint violated: {}", entity, detail);
                ServiceError::Conflict(format!("{} already exists", entity))
            }
            DbError::Database(e) => {
                error!("Database error on {}: {}", entity, e);
                ServiceError::Internal
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Unauthenticated => "UNAUTHENTICATED",
            ServiceError::Forbidden(_) => "FORBIDDEN",
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::Internal => "INTERNAL_ERROR",
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        (
            err.status(),
            Json(ErrorResponse {
                error: err.to_string(),
                code: Some(err.code().to_string()),
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbErr;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ServiceError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::Unauthenticated.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServiceError::Forbidden("x".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServiceError::Conflict("x".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::Internal.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_database_error_is_hidden() {
        let err = ServiceError::from_store(
            "Item",
            DbError::Database(DbErr::Custom("relation \"items\" does not exist".into())),
        );
        assert_eq!(err, ServiceError::Internal);

        let (status, Json(body)) = ApiError::from(err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal server error");
        assert!(!body.error.contains("relation"));
    }

    #[test]
    fn test_not_found_names_entity() {
        let err = ServiceError::from_store("Deal", DbError::NotFound);
        assert_eq!(err, ServiceError::NotFound("Deal not found".to_string()));
    }

    #[test]
    fn test_unique_violation_is_conflict() {
        let err = ServiceError::from_store("User", DbError::UniqueViolation("users.username".into()));
        assert_eq!(err, ServiceError::Conflict("User already exists".to_string()));
    }
}
