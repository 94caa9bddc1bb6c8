//! Adding and deleting inventory items.

use axum::http::StatusCode;

use super::common::TestApp;

#[tokio::test]
async fn test_admin_adds_item() {
    let mut app = TestApp::new().await;
    app.login_admin().await;

    app.post_form(
        "/items",
        &[("name", "Brass Fittings"), ("quantity", "40"), ("price", "2.499")],
    )
    .await
    .assert_redirect("/");

    let items = app.store().list_inventory().await.unwrap();
    let added = items.iter().find(|i| i.name == "Brass Fittings").unwrap();
    assert_eq!(added.quantity, 40);
    assert_eq!(added.price, 2.5);

    let index = app.get("/").await;
    assert!(index.body.contains("Item added successfully"));
    assert!(index.body.contains("Brass Fittings"));

    // flash is shown once
    assert!(!app.get("/").await.body.contains("Item added successfully"));
}

#[tokio::test]
async fn test_worker_cannot_add_item() {
    let mut app = TestApp::new().await;
    app.login_worker().await;

    let response = app
        .post_form("/items", &[("name", "Bolts"), ("quantity", "1"), ("price", "1")])
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error(), "Unauthorized");
    assert_eq!(app.store().list_inventory().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_add_item_validation() {
    let mut app = TestApp::new().await;
    app.login_admin().await;

    let cases = [
        (("", "1", "1"), "Missing or invalid fields"),
        (("Bolts", "ten", "1"), "Invalid quantity or price format"),
        (("Bolts", "1", "1,5"), "Invalid quantity or price format"),
        (("Bolts", "-1", "1"), "Quantity and price must be non-negative"),
        (("Bolts", "1", "-0.01"), "Quantity and price must be non-negative"),
    ];
    for ((name, quantity, price), expected) in cases {
        let response = app
            .post_form("/items", &[("name", name), ("quantity", quantity), ("price", price)])
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{name}/{quantity}/{price}");
        assert_eq!(response.error(), expected);
    }
    assert_eq!(app.store().list_inventory().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_item_name_is_escaped_on_render() {
    let mut app = TestApp::new().await;
    app.login_admin().await;

    app.post_form(
        "/items",
        &[("name", "<script>x</script>"), ("quantity", "1"), ("price", "1")],
    )
    .await
    .assert_redirect("/");

    let index = app.get("/").await;
    assert!(index.body.contains("&lt;script&gt;x&lt;/script&gt;"));
    assert!(!index.body.contains("<script>x</script>"));
}

#[tokio::test]
async fn test_admin_deletes_item() {
    let mut app = TestApp::new().await;
    app.login_admin().await;
    let first = app.store().list_inventory().await.unwrap()[0].id;

    app.post_form(&format!("/items/{first}/delete"), &[])
        .await
        .assert_redirect("/");

    let items = app.store().list_inventory().await.unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i.id != first));
    assert!(app.get("/").await.body.contains("Item deleted successfully"));
}

#[tokio::test]
async fn test_delete_missing_item() {
    let mut app = TestApp::new().await;
    app.login_admin().await;

    let response = app.post_form("/items/9999/delete", &[]).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error(), "Item not found");
}

#[tokio::test]
async fn test_worker_cannot_delete_item() {
    let mut app = TestApp::new().await;
    app.login_worker().await;

    let response = app.post_form("/items/1/delete", &[]).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(app.store().list_inventory().await.unwrap().len(), 3);
}
