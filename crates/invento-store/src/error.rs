//! Error types for the store crate.

use invento_core::ValidationError;
use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Query or connection failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failure.
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Row addressed by id does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The request references a user that no longer exists.
    #[error("invalid user ID for request")]
    InvalidRequestUser,

    /// The request was already approved or rejected.
    #[error("request has already been processed")]
    AlreadyDecided,

    /// Input rejected inside a transaction.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// `PRAGMA integrity_check` reported a problem.
    #[error("database integrity check failed: {0}")]
    Integrity(String),

    /// The directory holding the database file cannot be written.
    #[error("no write permission in {0}")]
    NotWritable(String),

    /// A stored value does not match the domain model.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// Password hashing failure.
    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// True for failures caused by the database itself rather than by input.
    pub fn is_database(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Migrate(_) | Self::Integrity(_) | Self::Corrupt(_)
        )
    }
}
