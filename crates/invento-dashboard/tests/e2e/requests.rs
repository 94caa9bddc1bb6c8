//! Restock requests and their approval workflow.

use axum::http::StatusCode;
use invento_core::RequestStatus;

use super::common::TestApp;

/// Log in as worker1, file a request and switch to the admin account.
async fn pending_request(app: &mut TestApp, item: &str, quantity: &str) -> i64 {
    app.login_worker().await;
    app.post_form("/requests", &[("item_name", item), ("quantity", quantity)])
        .await
        .assert_redirect("/");
    app.get("/logout").await;
    app.login_admin().await;

    app.store()
        .list_requests()
        .await
        .unwrap()
        .last()
        .map(|r| r.id)
        .unwrap()
}

#[tokio::test]
async fn test_worker_submits_request() {
    let mut app = TestApp::new().await;
    app.login_worker().await;

    app.post_form("/requests", &[("item_name", "Steel Rods"), ("quantity", "5")])
        .await
        .assert_redirect("/");

    let requests = app.store().list_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].username, "worker1");
    assert_eq!(requests[0].status, RequestStatus::Pending);

    let index = app.get("/").await;
    assert!(index.body.contains("Request submitted successfully"));
    assert!(index.body.contains("pending"));
}

#[tokio::test]
async fn test_request_validation() {
    let mut app = TestApp::new().await;
    app.login_worker().await;

    let cases = [
        (("", "5"), "Missing or invalid fields"),
        (("Steel Rods", "five"), "Invalid quantity format"),
        (("Steel Rods", "0"), "Quantity must be positive"),
        (("Steel Rods", "-3"), "Quantity must be positive"),
    ];
    for ((item, quantity), expected) in cases {
        let response = app
            .post_form("/requests", &[("item_name", item), ("quantity", quantity)])
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error(), expected);
    }
    assert!(app.store().list_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_approve_restocks_existing_item() {
    let mut app = TestApp::new().await;
    let id = pending_request(&mut app, "Steel Rods", "5").await;

    app.post_form(&format!("/requests/{id}/approve"), &[("price", "120")])
        .await
        .assert_redirect("/");

    let items = app.store().list_inventory().await.unwrap();
    let rods = items.iter().find(|i| i.name == "Steel Rods").unwrap();
    assert_eq!(rods.quantity, 105);
    assert_eq!(rods.price, 120.0);
    assert_eq!(items.len(), 3);

    let requests = app.store().list_requests().await.unwrap();
    assert_eq!(requests[0].status, RequestStatus::Approved);
    assert!(app.get("/").await.body.contains("Request approved successfully"));
}

#[tokio::test]
async fn test_approve_creates_new_item() {
    let mut app = TestApp::new().await;
    let id = pending_request(&mut app, "Titanium Bars", "8").await;

    app.post_form(&format!("/requests/{id}/approve"), &[("price", "310.5")])
        .await
        .assert_redirect("/");

    let items = app.store().list_inventory().await.unwrap();
    assert_eq!(items.len(), 4);
    let bars = items.iter().find(|i| i.name == "Titanium Bars").unwrap();
    assert_eq!(bars.quantity, 8);
    assert_eq!(bars.price, 310.5);
}

#[tokio::test]
async fn test_reject_leaves_inventory_untouched() {
    let mut app = TestApp::new().await;
    let id = pending_request(&mut app, "Steel Rods", "5").await;
    let before = app.store().list_inventory().await.unwrap();

    app.post_form(&format!("/requests/{id}/reject"), &[])
        .await
        .assert_redirect("/");

    assert_eq!(app.store().list_inventory().await.unwrap(), before);
    let requests = app.store().list_requests().await.unwrap();
    assert_eq!(requests[0].status, RequestStatus::Rejected);
    assert!(app.get("/").await.body.contains("Request rejected successfully"));
}

#[tokio::test]
async fn test_approve_requires_valid_price() {
    let mut app = TestApp::new().await;
    let id = pending_request(&mut app, "Steel Rods", "5").await;
    let path = format!("/requests/{id}/approve");

    let response = app.post_form(&path, &[]).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Price is required for approval");

    let response = app.post_form(&path, &[("price", "cheap")]).await;
    assert_eq!(response.error(), "Invalid price format");

    let response = app.post_form(&path, &[("price", "-4")]).await;
    assert_eq!(response.error(), "Price must be non-negative");

    let requests = app.store().list_requests().await.unwrap();
    assert_eq!(requests[0].status, RequestStatus::Pending);
    let rods = app.store().list_inventory().await.unwrap();
    assert_eq!(rods[0].quantity, 100);
}

#[tokio::test]
async fn test_approve_rejects_quantity_overflow() {
    let mut app = TestApp::new().await;
    app.login_admin().await;
    app.post_form(
        "/items",
        &[("name", "Gold"), ("quantity", "9223372036854775807"), ("price", "1")],
    )
    .await
    .assert_redirect("/");
    app.get("/logout").await;
    let id = pending_request(&mut app, "Gold", "1").await;

    let response = app
        .post_form(&format!("/requests/{id}/approve"), &[("price", "1")])
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Resulting quantity is too large");

    let requests = app.store().list_requests().await.unwrap();
    assert_eq!(requests[0].status, RequestStatus::Pending);
}

#[tokio::test]
async fn test_invalid_action() {
    let mut app = TestApp::new().await;
    let id = pending_request(&mut app, "Steel Rods", "5").await;

    let response = app.post_form(&format!("/requests/{id}/archive"), &[]).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Invalid action");
}

#[tokio::test]
async fn test_unknown_request() {
    let mut app = TestApp::new().await;
    app.login_admin().await;

    let response = app.post_form("/requests/404/reject", &[]).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error(), "Request not found");
}

#[tokio::test]
async fn test_decided_request_cannot_be_decided_again() {
    let mut app = TestApp::new().await;
    let id = pending_request(&mut app, "Steel Rods", "5").await;

    app.post_form(&format!("/requests/{id}/approve"), &[("price", "100")])
        .await
        .assert_redirect("/");
    let response = app
        .post_form(&format!("/requests/{id}/approve"), &[("price", "100")])
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error(), "Request has already been processed");

    let rods = app.store().list_inventory().await.unwrap();
    assert_eq!(rods[0].quantity, 105);
}

#[tokio::test]
async fn test_worker_cannot_decide() {
    let mut app = TestApp::new().await;
    let id = pending_request(&mut app, "Steel Rods", "5").await;
    app.get("/logout").await;
    app.login_worker().await;

    // role is checked before the action name
    let response = app.post_form(&format!("/requests/{id}/bogus"), &[]).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error(), "Unauthorized");
}
