//! Error types for the activity log.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActivityError {
    /// Storage backend failure other than plain IO.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
