//! CSRF protection for form posts.
//!
//! Every unsafe request must echo the session's token, either in the
//! `X-CSRF-Token` header or as the `csrf_token` form field.

use axum::body::{Body, to_bytes};
use axum::extract::Request;
use axum::http::Method;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use subtle::ConstantTimeEq;

use crate::error::DashboardError;
use crate::session::Session;

pub const CSRF_FORM_FIELD: &str = "csrf_token";
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Largest form body buffered for token lookup.
const MAX_FORM_BYTES: usize = 64 * 1024;

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE)
}

/// Constant-time token comparison.
pub fn tokens_match(expected: &str, submitted: &str) -> bool {
    expected.as_bytes().ct_eq(submitted.as_bytes()).into()
}

/// Pull `csrf_token` out of an urlencoded body.
fn form_token(body: &[u8]) -> Option<String> {
    url::form_urlencoded::parse(body)
        .find(|(k, _)| k == CSRF_FORM_FIELD)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// Reject unsafe requests whose token is missing or wrong.
///
/// Must run inside the session layer.
pub async fn csrf_protect(session: Session, request: Request, next: Next) -> Response {
    if is_safe(request.method()) {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();

    let header_token = parts
        .headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let bytes = match to_bytes(body, MAX_FORM_BYTES).await {
        Ok(b) => b,
        Err(_) => {
            return DashboardError::InvalidRequest("Request body too large".to_string())
                .into_response();
        }
    };

    let Some(submitted) = header_token.or_else(|| form_token(&bytes)) else {
        tracing::warn!(path = %parts.uri.path(), "rejected post without CSRF token");
        return DashboardError::CsrfMissing.into_response();
    };

    let valid = session
        .existing_csrf_token()
        .is_some_and(|expected| tokens_match(&expected, &submitted));
    if !valid {
        tracing::warn!(path = %parts.uri.path(), "rejected post with mismatched CSRF token");
        return DashboardError::CsrfMismatch.into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
