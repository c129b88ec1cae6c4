// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::error;

use super::validation::ValidationResult;
use crate::notifications::NotificationError;
use crate::storage::StoreError;

/// API error types
///
/// `Unauthenticated` means no actor could be resolved for the request,
/// `Unauthorized` means an actor was resolved but the policy denied the action.
#[derive(Debug)]
pub enum ApiError {
    Unauthenticated(String),
    Unauthorized(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    InternalServer(String),
    DatabaseError(sqlx::Error),
    ValidationError(String),
}

impl ApiError {
    /// Stable machine-readable code, also used in the JSON body
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServer(_) => "INTERNAL_SERVER_ERROR",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServer(_) | ApiError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn unauthenticated() -> Self {
        ApiError::Unauthenticated("authentication required".to_string())
    }

    /// Constant-shape denial; never mentions the target
    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("not permitted".to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let code = self.code().to_string();

        let error_message = match self {
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                "Database operation failed".to_string()
            }
            ApiError::InternalServer(msg) => {
                error!(error = %msg, "Internal error occurred");
                "Internal server error".to_string()
            }
            ApiError::Unauthenticated(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::ValidationError(msg) => msg,
        };

        let error_response = ErrorResponse {
            error: error_message,
            code,
        };

        (status, Json(error_response)).into_response()
    }
}

/// Storage failures are translated here so that no storage detail leaks upward.
/// Callers that know better (e.g. a unique violation meaning "duplicate
/// application", or a busy database during a conditional status write) map
/// the `StoreError` themselves before reaching this.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("resource not found".to_string()),
            StoreError::UniqueViolation => {
                ApiError::Conflict("resource already exists".to_string())
            }
            StoreError::ForeignKeyViolation => {
                ApiError::NotFound("referenced resource not found".to_string())
            }
            StoreError::Busy => ApiError::InternalServer("database is busy".to_string()),
            StoreError::Corrupt(msg) => ApiError::InternalServer(msg),
            StoreError::Database(e) => ApiError::DatabaseError(e),
        }
    }
}

impl From<NotificationError> for ApiError {
    fn from(err: NotificationError) -> Self {
        ApiError::InternalServer(err.to_string())
    }
}

/// Helper function to convert ValidationResult to ApiError
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ApiError::InternalServer(
                "Validation result was valid but converted to error".to_string(),
            )
        } else {
            let error_messages: Vec<String> = result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            ApiError::ValidationError(error_messages.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_and_authorization_are_distinct() {
        let unauthenticated = ApiError::unauthenticated();
        let unauthorized = ApiError::unauthorized();

        assert_eq!(unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(unauthorized.status_code(), StatusCode::FORBIDDEN);
        assert_ne!(unauthenticated.code(), unauthorized.code());
    }

    #[test]
    fn test_store_errors_map_to_taxonomy() {
        assert!(matches!(
            ApiError::from(StoreError::NotFound),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(StoreError::UniqueViolation),
            ApiError::Conflict(_)
        ));
        // lock contention is transient; only status writes report it as a conflict
        assert!(matches!(
            ApiError::from(StoreError::Busy),
            ApiError::InternalServer(_)
        ));
        assert!(matches!(
            ApiError::from(StoreError::Database(sqlx::Error::RowNotFound)),
            ApiError::DatabaseError(_)
        ));
    }

    #[test]
    fn test_conflict_status_code() {
        let err = ApiError::Conflict("application already accepted".to_string());
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "CONFLICT");
    }
}
