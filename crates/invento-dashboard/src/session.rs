//! Signed-cookie sessions.
//!
//! The whole session lives in the `invento_session` cookie as base64url JSON
//! followed by an HMAC-SHA256 signature. The signing key is generated when
//! the process starts, so a restart logs everybody out. Cookies that fail to
//! decode or verify are treated as an empty session.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use invento_core::Role;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::DashboardError;
use crate::state::AppState;

/// Session cookie name
pub const SESSION_COOKIE_NAME: &str = "invento_session";

type HmacSha256 = Hmac<Sha256>;

/// The logged-in account, copied from `users` at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// Everything stored in the cookie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,

    /// Unix seconds of the last request that passed the login gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flashes: Vec<Flash>,
}

impl SessionData {
    /// True when the last recorded activity is more than `lifetime` before
    /// `now`. A session without a timestamp never expires.
    pub fn is_expired(&self, now: i64, lifetime: Duration) -> bool {
        match self.last_active {
            Some(last) => now.saturating_sub(last) > lifetime.as_secs() as i64,
            None => false,
        }
    }
}

/// Signs and verifies session cookies.
#[derive(Clone)]
pub struct SessionCodec {
    mac: HmacSha256,
    cookie_secure: bool,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec")
            .field("cookie_secure", &self.cookie_secure)
            .finish_non_exhaustive()
    }
}

impl SessionCodec {
    pub fn new(key: &[u8], cookie_secure: bool) -> Result<Self, DashboardError> {
        let mac = HmacSha256::new_from_slice(key)
            .map_err(|e| DashboardError::StartupFailed(format!("session key: {e}")))?;
        Ok(Self { mac, cookie_secure })
    }

    /// Codec with a fresh random 32-byte key.
    pub fn generate(cookie_secure: bool) -> Result<Self, DashboardError> {
        let key: [u8; 32] = rand::random();
        Self::new(&key, cookie_secure)
    }

    pub fn encode(&self, data: &SessionData) -> Result<String, DashboardError> {
        let json = serde_json::to_vec(data).map_err(anyhow::Error::from)?;
        let payload = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{payload}.{signature}"))
    }

    pub fn decode(&self, value: &str) -> Option<SessionData> {
        let (payload, signature) = value.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        serde_json::from_slice(&json).ok()
    }

    /// Read the session from request headers, empty when absent or invalid.
    pub fn read(&self, headers: &HeaderMap) -> SessionData {
        extract_cookie(headers, SESSION_COOKIE_NAME)
            .and_then(|v| self.decode(&v))
            .unwrap_or_default()
    }

    pub fn set_cookie(&self, data: &SessionData) -> Result<HeaderValue, DashboardError> {
        let value = self.encode(data)?;
        let secure = if self.cookie_secure { "; Secure" } else { "" };
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax{}",
            SESSION_COOKIE_NAME, value, secure
        );
        HeaderValue::from_str(&cookie).map_err(|e| DashboardError::Internal(e.into()))
    }
}

/// Extract a cookie value from the `Cookie` headers.
fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .find_map(|c| c.trim().strip_prefix(prefix.as_str()).map(str::to_string))
}

#[derive(Debug, Default)]
struct SessionInner {
    data: SessionData,
    dirty: bool,
}

/// Per-request handle on the session, shared between middleware and
/// handlers. Any change marks the cookie for rewriting.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<Mutex<SessionInner>>,
}

impl Session {
    pub fn new(data: SessionData) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner { data, dirty: false })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn update<T>(&self, f: impl FnOnce(&mut SessionData) -> T) -> T {
        let mut inner = self.lock();
        inner.dirty = true;
        f(&mut inner.data)
    }

    pub fn snapshot(&self) -> SessionData {
        self.lock().data.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.lock().data.user.clone()
    }

    /// Value recorded as the acting user in the activity log.
    pub fn actor(&self) -> String {
        self.lock()
            .data
            .user
            .as_ref()
            .map(|u| u.id.to_string())
            .unwrap_or_else(|| "anonymous".to_string())
    }

    /// Start an authenticated session. The CSRF token is rotated.
    pub fn login(&self, user: SessionUser, now: i64) {
        self.update(|data| {
            data.user = Some(user);
            data.last_active = Some(now);
            data.csrf_token = None;
        });
    }

    /// Drop everything except pending flashes.
    pub fn clear(&self) {
        self.update(|data| {
            let flashes = std::mem::take(&mut data.flashes);
            *data = SessionData {
                flashes,
                ..SessionData::default()
            };
        });
    }

    pub fn touch(&self, now: i64) {
        self.update(|data| data.last_active = Some(now));
    }

    /// The session's CSRF token, created on first use.
    pub fn csrf_token(&self) -> String {
        if let Some(token) = self.lock().data.csrf_token.clone() {
            return token;
        }
        let token = URL_SAFE_NO_PAD.encode(rand::random::<[u8; 32]>());
        self.update(|data| data.csrf_token = Some(token.clone()));
        token
    }

    /// Stored CSRF token without creating one.
    pub fn existing_csrf_token(&self) -> Option<String> {
        self.lock().data.csrf_token.clone()
    }

    pub fn flash(&self, level: FlashLevel, message: impl Into<String>) {
        let message = message.into();
        self.update(|data| data.flashes.push(Flash { level, message }));
    }

    pub fn take_flashes(&self) -> Vec<Flash> {
        let mut inner = self.lock();
        if inner.data.flashes.is_empty() {
            return Vec::new();
        }
        inner.dirty = true;
        std::mem::take(&mut inner.data.flashes)
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = DashboardError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| DashboardError::Internal(anyhow::anyhow!("session layer missing")))
    }
}

/// Load the session before the handler runs and write it back afterwards
/// when it changed.
pub async fn session_layer(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let codec = state.sessions();
    let session = Session::new(codec.read(request.headers()));
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;

    if session.is_dirty() {
        match codec.set_cookie(&session.snapshot()) {
            Ok(cookie) => {
                response.headers_mut().append(SET_COOKIE, cookie);
            }
            Err(e) => tracing::error!(error = %e, "failed to write session cookie"),
        }
    }
    response
}
