//! Error types for the dashboard crate.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use invento_core::ValidationError;
use invento_store::StoreError;
use thiserror::Error;

use crate::templates;

/// Errors that can occur in the dashboard.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Failed to start the server.
    #[error("failed to start dashboard: {0}")]
    StartupFailed(String),

    /// The session user lacks the admin role.
    #[error("Unauthorized")]
    NotAuthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidRequest(String),

    /// The request was already approved or rejected.
    #[error("{0}")]
    Conflict(String),

    #[error("The CSRF token is missing.")]
    CsrfMissing,

    #[error("The CSRF tokens do not match.")]
    CsrfMismatch,

    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl DashboardError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotAuthorized => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidRequest(_) | Self::CsrfMissing | Self::CsrfMismatch => {
                StatusCode::BAD_REQUEST
            }
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::StartupFailed(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ValidationError> for DashboardError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidRequest(err.message().to_string())
    }
}

impl From<StoreError> for DashboardError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            StoreError::InvalidRequestUser => {
                Self::InvalidRequest("Invalid user ID for request".to_string())
            }
            StoreError::AlreadyDecided => {
                Self::Conflict("Request has already been processed".to_string())
            }
            StoreError::Validation(v) => v.into(),
            StoreError::Database(e) => Self::Database(e.to_string()),
            other if other.is_database() => Self::Database(other.to_string()),
            other => Self::Internal(other.into()),
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            // Unexpected failures get a page, never the error text.
            Self::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                (
                    status,
                    Html(templates::error_page(
                        "Internal server error. Please try again later.",
                    )),
                )
                    .into_response()
            }
            other => {
                let body = serde_json::json!({ "error": other.to_string() });
                (status, Json(body)).into_response()
            }
        }
    }
}
