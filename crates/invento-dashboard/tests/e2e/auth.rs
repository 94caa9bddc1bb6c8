//! Login, logout, CSRF and session expiry.

use std::time::Duration;

use axum::http::StatusCode;
use chrono::Utc;
use invento_core::Role;
use invento_dashboard::{SessionCodec, SessionData};
use invento_dashboard::session::SessionUser;

use super::common::TestApp;

#[tokio::test]
async fn test_healthz() {
    let mut app = TestApp::new().await;
    let response = app.get("/healthz").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["ok"], true);
    assert_eq!(response.json()["service"], "invento");
}

#[tokio::test]
async fn test_anonymous_user_is_sent_to_login() {
    let mut app = TestApp::new().await;
    app.get("/").await.assert_redirect("/login");
    app.get("/activity").await.assert_redirect("/login");
}

#[tokio::test]
async fn test_login_page_issues_csrf_token() {
    let mut app = TestApp::new().await;
    let page = app.get("/login").await;
    assert_eq!(page.status, StatusCode::OK);

    let token = app.session().csrf_token.unwrap();
    assert!(page.body.contains(&format!(r#"name="csrf_token" value="{token}""#)));
}

#[tokio::test]
async fn test_admin_login_and_index() {
    let mut app = TestApp::new().await;
    app.login_admin().await;

    let session = app.session();
    let user = session.user.unwrap();
    assert_eq!(user.username, "admin");
    assert_eq!(user.role, Role::Admin);

    let index = app.get("/").await;
    assert_eq!(index.status, StatusCode::OK);
    for name in ["Steel Rods", "Copper Sheets", "Aluminum Pipes"] {
        assert!(index.body.contains(name), "missing {name}");
    }
    assert!(index.body.contains("149.50"));
    assert!(index.body.contains(r#"action="/items""#));
}

#[tokio::test]
async fn test_login_requires_matching_role() {
    let mut app = TestApp::new().await;
    let response = app.login("worker1", "worker123", "admin").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Invalid username, password, or role"));
    assert!(app.session().user.is_none());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let mut app = TestApp::new().await;
    let response = app.login("admin", "admin124", "admin").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Invalid username, password, or role"));
}

#[tokio::test]
async fn test_login_rejects_malformed_input() {
    let mut app = TestApp::new().await;
    let long_name = "a".repeat(51);
    let response = app.login(&long_name, "pw", "worker").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Invalid or missing login details"));

    let response = app.login("admin", "admin123", "superuser").await;
    assert!(response.body.contains("Invalid or missing login details"));
}

#[tokio::test]
async fn test_post_without_csrf_token_is_rejected() {
    let mut app = TestApp::new().await;
    app.get("/login").await;

    let response = app
        .post_raw("/login", "username=admin&password=admin123&role=admin")
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "The CSRF token is missing.");
    assert!(app.session().user.is_none());
}

#[tokio::test]
async fn test_post_with_wrong_csrf_token_is_rejected() {
    let mut app = TestApp::new().await;
    app.get("/login").await;

    let response = app
        .post_raw(
            "/login",
            "csrf_token=forged&username=admin&password=admin123&role=admin",
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "The CSRF tokens do not match.");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let mut app = TestApp::new().await;
    app.login_worker().await;

    app.get("/logout").await.assert_redirect("/login");
    assert!(app.session().user.is_none());
    app.get("/").await.assert_redirect("/login");
}

#[tokio::test]
async fn test_forged_cookie_is_ignored() {
    let mut app = TestApp::new().await;
    app.login_worker().await;

    // Re-sign the session with another key: the server must not accept it.
    let mut data = app.session();
    data.user = Some(SessionUser {
        id: 1,
        username: "admin".into(),
        role: Role::Admin,
    });
    let other = SessionCodec::generate(false).unwrap();
    app.set_raw_cookie(&format!("invento_session={}", other.encode(&data).unwrap()));

    app.get("/").await.assert_redirect("/login");
}

#[tokio::test]
async fn test_idle_session_times_out() {
    let mut app = TestApp::with_lifetime(Duration::from_secs(30 * 60)).await;
    let admin = app
        .store()
        .find_user_by_username("admin")
        .await
        .unwrap()
        .unwrap();

    app.set_session(&SessionData {
        user: Some(SessionUser {
            id: admin.id,
            username: admin.username,
            role: admin.role,
        }),
        last_active: Some(Utc::now().timestamp() - 31 * 60),
        ..SessionData::default()
    });

    app.get("/").await.assert_redirect("/login");
    assert!(app.session().user.is_none());

    let login = app.get("/login").await;
    assert!(login.body.contains("Session timed out. Please log in again."));
}

#[tokio::test]
async fn test_active_session_is_refreshed() {
    let mut app = TestApp::new().await;
    let admin = app
        .store()
        .find_user_by_username("admin")
        .await
        .unwrap()
        .unwrap();

    let started = Utc::now().timestamp() - 10 * 60;
    app.set_session(&SessionData {
        user: Some(SessionUser {
            id: admin.id,
            username: admin.username,
            role: admin.role,
        }),
        last_active: Some(started),
        ..SessionData::default()
    });

    assert_eq!(app.get("/").await.status, StatusCode::OK);
    assert!(app.session().last_active.unwrap() > started);
}
