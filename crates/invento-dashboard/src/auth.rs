//! Login, logout and the login gate.
//!
//! Also home to the request extractors handlers use to learn who is calling:
//! [`CurrentUser`] for the session user and [`ActivityContext`] for writing
//! activity events tagged with the client IP.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Form;
use axum::extract::{ConnectInfo, FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::Utc;
use invento_audit::{ActivityEvent, ActivityEventBuilder, ActivityKind, ActivityLevel, ActivityLogger};
use invento_core::LoginAttempt;
use serde::Deserialize;

use crate::error::DashboardError;
use crate::pages;
use crate::session::{Flash, FlashLevel, Session, SessionUser};
use crate::state::AppState;

/// Remote address of the connection, `unknown` when the server was not
/// started with connect info.
fn client_ip(parts: &Parts) -> String {
    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Writes activity events tagged with the caller's IP and session user.
pub struct ActivityContext {
    logger: Arc<ActivityLogger>,
    client_ip: String,
    user: String,
}

impl FromRequestParts<AppState> for ActivityContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<Session>()
            .map(Session::actor)
            .unwrap_or_else(|| "anonymous".to_string());
        Ok(Self {
            logger: state.activity().clone(),
            client_ip: client_ip(parts),
            user,
        })
    }
}

impl ActivityContext {
    pub fn event(&self, kind: ActivityKind, message: impl Into<String>) -> ActivityEventBuilder {
        ActivityEvent::builder(kind, message)
            .client_ip(&self.client_ip)
            .user(&self.user)
    }

    pub async fn record(&self, kind: ActivityKind, message: impl Into<String>) {
        self.logger.record(self.event(kind, message).build()).await;
    }

    pub async fn record_event(&self, event: ActivityEvent) {
        self.logger.record(event).await;
    }

    /// Record a failed action and hand the error back.
    pub async fn failure(&self, action: &str, err: DashboardError) -> DashboardError {
        let (kind, level) = match &err {
            DashboardError::NotAuthorized => (ActivityKind::AccessDenied, ActivityLevel::Warning),
            DashboardError::Database(_) => (ActivityKind::DatabaseError, ActivityLevel::Error),
            DashboardError::Internal(_) | DashboardError::StartupFailed(_) => {
                (ActivityKind::System, ActivityLevel::Error)
            }
            _ => (ActivityKind::InvalidInput, ActivityLevel::Warning),
        };
        self.record_event(
            self.event(kind, format!("{action} failed: {err}"))
                .level(level)
                .build(),
        )
        .await;
        err
    }

    /// Pass `result` through, recording it first when it is an error.
    pub async fn outcome<T>(
        &self,
        action: &str,
        result: Result<T, DashboardError>,
    ) -> Result<T, DashboardError> {
        match result {
            Ok(v) => Ok(v),
            Err(e) => Err(self.failure(action, e).await),
        }
    }
}

/// The logged-in user. Requests without one are sent to `/login`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionUser);

impl CurrentUser {
    pub fn require_admin(&self) -> Result<(), DashboardError> {
        if self.0.role.is_admin() {
            Ok(())
        } else {
            Err(DashboardError::NotAuthorized)
        }
    }
}

impl std::ops::Deref for CurrentUser {
    type Target = SessionUser;

    fn deref(&self) -> &SessionUser {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .and_then(Session::user)
            .map(CurrentUser)
            .ok_or_else(|| Redirect::to("/login"))
    }
}

/// Gate for every page behind the login.
///
/// Sessions idle for longer than the configured lifetime are cleared and
/// sent back to the login page with a notice; live ones get their activity
/// timestamp refreshed.
pub async fn require_login(
    State(state): State<AppState>,
    session: Session,
    activity: ActivityContext,
    request: Request,
    next: Next,
) -> Response {
    let data = session.snapshot();
    let Some(user) = data.user.as_ref() else {
        tracing::debug!(path = %request.uri().path(), "redirecting to login: no active session");
        return Redirect::to("/login").into_response();
    };

    let now = Utc::now().timestamp();
    if data.is_expired(now, state.session_lifetime()) {
        activity
            .record(
                ActivityKind::SessionExpired,
                format!("Session timed out for user {}", user.id),
            )
            .await;
        session.clear();
        session.flash(FlashLevel::Error, "Session timed out. Please log in again.");
        return Redirect::to("/login").into_response();
    }

    session.touch(now);
    next.run(request).await
}

/// Login form data
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Handler for the login page (GET)
pub async fn login_page(session: Session) -> Html<String> {
    Html(pages::login_page(&session.csrf_token(), &session.take_flashes()))
}

/// Handler for login form submission (POST)
pub async fn login_submit(
    State(state): State<AppState>,
    session: Session,
    activity: ActivityContext,
    Form(form): Form<LoginForm>,
) -> Result<Response, DashboardError> {
    let attempt = match LoginAttempt::parse(
        form.username.as_deref(),
        form.password.as_deref(),
        form.role.as_deref(),
    ) {
        Ok(attempt) => attempt,
        Err(e) => {
            let username = form.username.as_deref().unwrap_or_default().trim();
            activity
                .record(
                    ActivityKind::LoginFailed,
                    format!("Invalid login attempt with username: {username}"),
                )
                .await;
            return Ok(login_with_error(&session, e.message()));
        }
    };

    let user = activity
        .outcome("Login", state.store().authenticate(&attempt).await.map_err(Into::into))
        .await?;

    match user {
        Some(user) => {
            activity
                .record_event(
                    activity
                        .event(
                            ActivityKind::LoggedIn,
                            format!("User {} logged in as {}", user.username, user.role),
                        )
                        .user(user.id.to_string())
                        .build(),
                )
                .await;
            session.login(
                SessionUser {
                    id: user.id,
                    username: user.username,
                    role: user.role,
                },
                Utc::now().timestamp(),
            );
            Ok(Redirect::to("/").into_response())
        }
        None => {
            activity
                .record(
                    ActivityKind::LoginFailed,
                    format!(
                        "Failed login attempt for username: {}, role: {}",
                        attempt.username, attempt.role
                    ),
                )
                .await;
            Ok(login_with_error(&session, "Invalid username, password, or role"))
        }
    }
}

/// Re-render the login form with pending flashes plus `message`.
fn login_with_error(session: &Session, message: &str) -> Response {
    let mut flashes = session.take_flashes();
    flashes.push(Flash {
        level: FlashLevel::Error,
        message: message.to_string(),
    });
    Html(pages::login_page(&session.csrf_token(), &flashes)).into_response()
}

/// Handler for logout
pub async fn logout(session: Session, activity: ActivityContext) -> Redirect {
    let user = session.actor();
    session.clear();
    activity
        .record(ActivityKind::LoggedOut, format!("User {user} logged out"))
        .await;
    Redirect::to("/login")
}
