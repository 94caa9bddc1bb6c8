//! Shared harness for the end-to-end tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use invento_audit::{ActivityLogger, NullStorage};
use invento_dashboard::session::SESSION_COOKIE_NAME;
use invento_dashboard::{AppState, SessionCodec, SessionData, create_router};
use invento_store::{InitOptions, Store};
use tempfile::TempDir;
use tower::ServiceExt;

pub const SESSION_KEY: &[u8] = b"e2e-session-key-e2e-session-key!!";

/// A router over a fresh database plus a one-user cookie jar.
pub struct TestApp {
    pub state: AppState,
    router: Router,
    cookie: Option<String>,
    client_addr: Option<SocketAddr>,
    _dir: TempDir,
}

/// Response status, headers and body read to a string.
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }

    pub fn error(&self) -> String {
        self.json()["error"].as_str().unwrap_or_default().to_string()
    }

    pub fn assert_redirect(&self, to: &str) {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        assert_eq!(self.location.as_deref(), Some(to));
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_lifetime(Duration::from_secs(30 * 60)).await
    }

    pub async fn with_lifetime(lifetime: Duration) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let opts = InitOptions {
            retries: 1,
            retry_delay: Duration::ZERO,
            ..InitOptions::default()
        };
        let store = invento_store::initialize(&dir.path().join("inventory.db"), &opts)
            .await
            .unwrap();

        let activity = Arc::new(ActivityLogger::with_storage(Arc::new(NullStorage::new())));
        let codec = SessionCodec::new(SESSION_KEY, false).unwrap();
        let state = AppState::with_codec(store, activity, codec, lifetime);

        Self {
            router: create_router(state.clone()),
            state,
            cookie: None,
            client_addr: None,
            _dir: dir,
        }
    }

    pub fn store(&self) -> &Store {
        self.state.store()
    }

    /// Pretend requests arrive from `addr`.
    pub fn from_addr(&mut self, addr: &str) {
        self.client_addr = Some(addr.parse().unwrap());
    }

    /// Replace the cookie jar with a session built by hand.
    pub fn set_session(&mut self, data: &SessionData) {
        let codec = SessionCodec::new(SESSION_KEY, false).unwrap();
        self.cookie = Some(format!("{}={}", SESSION_COOKIE_NAME, codec.encode(data).unwrap()));
    }

    /// Decode the current session cookie.
    pub fn session(&self) -> SessionData {
        let codec = SessionCodec::new(SESSION_KEY, false).unwrap();
        let value = self
            .cookie
            .as_deref()
            .and_then(|c| c.strip_prefix(&format!("{SESSION_COOKIE_NAME}=")))
            .unwrap_or_default();
        codec.decode(value).unwrap_or_default()
    }

    pub fn set_raw_cookie(&mut self, cookie: &str) {
        self.cookie = Some(cookie.to_string());
    }

    pub fn clear_cookies(&mut self) {
        self.cookie = None;
    }

    async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }
        if let Some(addr) = self.client_addr {
            request.extensions_mut().insert(ConnectInfo(addr));
        }

        let response: Response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set) = response.headers().get(header::SET_COOKIE) {
            let pair = set.to_str().unwrap().split(';').next().unwrap().to_string();
            self.cookie = Some(pair);
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            location,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        self.send(request).await
    }

    /// POST an urlencoded form exactly as given.
    pub async fn post_raw(&mut self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// POST a form with the session's CSRF token attached.
    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let token = self
            .session()
            .csrf_token
            .expect("no CSRF token in session; load a page first");
        let mut body = url::form_urlencoded::Serializer::new(String::new());
        body.append_pair("csrf_token", &token);
        for (k, v) in fields {
            body.append_pair(k, v);
        }
        let body = body.finish();
        self.post_raw(path, &body).await
    }

    pub async fn login(&mut self, username: &str, password: &str, role: &str) -> TestResponse {
        let page = self.get("/login").await;
        assert_eq!(page.status, StatusCode::OK);
        let response = self
            .post_form(
                "/login",
                &[("username", username), ("password", password), ("role", role)],
            )
            .await;
        if response.status == StatusCode::SEE_OTHER {
            // Pick up the token issued for the new session.
            self.get("/").await;
        }
        response
    }

    pub async fn login_admin(&mut self) {
        self.login("admin", "admin123", "admin")
            .await
            .assert_redirect("/");
    }

    pub async fn login_worker(&mut self) {
        self.login("worker1", "worker123", "worker")
            .await
            .assert_redirect("/");
    }
}
