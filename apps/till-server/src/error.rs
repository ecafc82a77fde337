//! Error types for the HTTP API.
//!
//! Every failure leaves the server as `{code, message}` JSON:
//!
//! ```text
//! ValidationError, TotalMismatch, AmountOverflow, ... → 400 VALIDATION_ERROR, ...
//! ProductNotFound, SaleNotFound, DbError::NotFound → 404 NOT_FOUND
//! InsufficientStock                                → 400 INSUFFICIENT_STOCK
//! UniqueViolation, ValidationError::Duplicate      → 409 DUPLICATE
//! anything else                                    → 500 INTERNAL_ERROR
//! ```
//!
//! 500 responses carry a generic message; the cause is only logged.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use till_core::{CoreError, ValidationError};
use till_db::DbError;
use tracing::error;

/// Error returned by handlers.
#[derive(Debug, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    /// Logs the cause and hides it from the client.
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        error!(error = %cause, "Request failed");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Internal server error",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code,
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::ProductNotFound(_) | CoreError::SaleNotFound(_) => {
                ApiError::not_found(message)
            }
            CoreError::InsufficientStock { .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, "INSUFFICIENT_STOCK", message)
            }
            CoreError::Validation(ValidationError::Duplicate { .. }) => {
                ApiError::new(StatusCode::CONFLICT, "DUPLICATE", message)
            }
            CoreError::Validation(_) => ApiError::bad_request(message),
            CoreError::EmptyCart => ApiError::new(StatusCode::BAD_REQUEST, "EMPTY_CART", message),
            CoreError::CartTooLarge { .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, "CART_TOO_LARGE", message)
            }
            CoreError::QuantityTooLarge { .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, "QUANTITY_TOO_LARGE", message)
            }
            CoreError::TotalMismatch { .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, "TOTAL_MISMATCH", message)
            }
            CoreError::AmountOverflow { .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, "AMOUNT_OVERFLOW", message)
            }
            CoreError::InvalidPhone(_) => {
                ApiError::new(StatusCode::BAD_REQUEST, "INVALID_PHONE", message)
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Core(core) => core.into(),
            DbError::NotFound { .. } => ApiError::not_found(err.to_string()),
            DbError::UniqueViolation { .. } => {
                ApiError::new(StatusCode::CONFLICT, "DUPLICATE", err.to_string())
            }
            DbError::ForeignKeyViolation { .. } => ApiError::bad_request(err.to_string()),
            other => ApiError::internal(other),
        }
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
