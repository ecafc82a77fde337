//! # Storage Errors
//!
//! ```text
//! sqlx::Error ─────────────┐
//! MigrateError ────────────┤
//!                          ▼
//! CoreError ──(#[from])──► DbError ──► ApiError (till-server)
//!   e.g. InsufficientStock found inside the checkout transaction
//! ```

use thiserror::Error;
use till_core::CoreError;

/// Failures from the storage layer.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the write, e.g. a category name that already
    /// exists in another case.
    #[error("{field} '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A row points at a category or supplier that is gone.
    #[error("Broken reference: {message}")]
    ForeignKeyViolation { message: String },

    #[error("Cannot open database: {0}")]
    ConnectionFailed(String),

    #[error("Schema migration failed: {0}")]
    MigrationFailed(String),

    #[error("Statement failed: {0}")]
    QueryFailed(String),

    /// BEGIN, COMMIT or ROLLBACK failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// No connection became free within the acquire timeout.
    #[error("All database connections are busy")]
    PoolExhausted,

    /// Business rule rejection, passed through unchanged.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Unexpected database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation { .. })
    }
}

/// SQLite reports constraint failures only through the message text:
/// `UNIQUE constraint failed: categories.name`, `FOREIGN KEY constraint failed`.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "unknown"),
            sqlx::Error::Database(db_err) => {
                let message = db_err.message();
                if let Some(column) = message.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::duplicate(column, "value")
                } else if message.starts_with("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: message.to_string(),
                    }
                } else {
                    DbError::QueryFailed(message.to_string())
                }
            }
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
