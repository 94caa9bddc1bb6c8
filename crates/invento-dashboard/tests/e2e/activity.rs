//! Activity log recording and the admin activity page.

use axum::http::StatusCode;
use invento_audit::ActivityKind;

use super::common::TestApp;

#[tokio::test]
async fn test_events_carry_client_ip_and_user() {
    let mut app = TestApp::new().await;
    app.from_addr("10.1.2.3:51000");
    app.login_admin().await;
    app.post_form("/items", &[("name", "Bolts"), ("quantity", "3"), ("price", "0.2")])
        .await
        .assert_redirect("/");

    let events = app.state.activity().recent(50);
    let added = events
        .iter()
        .find(|e| e.kind == ActivityKind::ItemAdded)
        .unwrap();
    assert_eq!(added.message, "Added item: Bolts");
    assert_eq!(added.client_ip, "10.1.2.3");
    assert_eq!(added.user, app.session().user.unwrap().id.to_string());

    let login = events
        .iter()
        .find(|e| e.kind == ActivityKind::LoggedIn)
        .unwrap();
    assert_eq!(login.message, "User admin logged in as admin");
}

#[tokio::test]
async fn test_unknown_client_without_connect_info() {
    let mut app = TestApp::new().await;
    app.login("ghost", "nope", "worker").await;

    let events = app.state.activity().recent(10);
    let failed = events
        .iter()
        .find(|e| e.kind == ActivityKind::LoginFailed)
        .unwrap();
    assert_eq!(failed.client_ip, "unknown");
    assert_eq!(failed.user, "anonymous");
}

#[tokio::test]
async fn test_denied_actions_are_recorded() {
    let mut app = TestApp::new().await;
    app.login_worker().await;
    app.post_form("/items/1/delete", &[]).await;

    let events = app.state.activity().recent(10);
    assert!(events.iter().any(|e| e.kind == ActivityKind::AccessDenied));
}

#[tokio::test]
async fn test_activity_page_is_admin_only() {
    let mut app = TestApp::new().await;
    app.login_worker().await;
    let response = app.get("/activity").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    app.get("/logout").await;
    app.login_admin().await;
    let response = app.get("/activity").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("User admin logged in as admin"));
    assert!(response.body.contains("LOGGED_OUT"));
}
