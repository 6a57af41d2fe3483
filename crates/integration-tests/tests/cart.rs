//! Cart flows through the session: add, merge, update, remove, clear.

use axum::http::StatusCode;
use garys_store_integration_tests::TestApp;

#[tokio::test]
async fn test_add_redirects_back_and_counts_items() {
    let mut app = TestApp::sample();

    let response = app.add_to_cart("linen-shirt", 2).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/cart"));

    let cart = app.get("/cart").await;
    assert_eq!(cart.status, StatusCode::OK);
    assert!(cart.body.contains("linen shirt"));
    assert!(cart.body.contains("M / Blue"));
    assert!(cart.body.contains("$80.00"));
}

#[tokio::test]
async fn test_same_selection_merges_into_one_line() {
    let mut app = TestApp::sample();

    app.add_to_cart("linen-shirt", 1).await;
    app.add_to_cart("linen-shirt", 2).await;

    assert_eq!(app.line_ids().await.len(), 1);
    let cart = app.get("/cart").await;
    assert!(cart.body.contains("<span class=\"quantity\">3</span>"));
}

#[tokio::test]
async fn test_different_size_adds_a_second_line() {
    let mut app = TestApp::sample();

    app.add_to_cart("linen-shirt", 1).await;
    app.post_form(
        "/cart/add",
        &[
            ("slug", "linen-shirt"),
            ("size", "L"),
            ("color", "Blue"),
            ("quantity", "1"),
        ],
    )
    .await;

    assert_eq!(app.line_ids().await.len(), 2);
}

#[tokio::test]
async fn test_customizations_are_kept_on_the_line() {
    let mut app = TestApp::sample();

    let response = app
        .post_form(
            "/cart/add",
            &[
                ("slug", "wool-suit"),
                ("size", "S"),
                ("color", "Black"),
                ("custom_fabrics", "Linen"),
                ("quantity", "1"),
                ("return_to", "/cart"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let cart = app.get("/cart").await;
    assert!(cart.body.contains("Fabrics: Linen"));
}

#[tokio::test]
async fn test_missing_size_rerenders_product_with_error() {
    let mut app = TestApp::sample();

    let response = app
        .post_form(
            "/cart/add",
            &[("slug", "linen-shirt"), ("color", "Blue"), ("quantity", "1")],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.contains("Please select size and color"));

    let cart = app.get("/cart").await;
    assert!(cart.body.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_out_of_stock_product_cannot_be_added() {
    let mut app = TestApp::sample();

    let response = app.add_to_cart("school-blazer", 1).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.contains("This product is out of stock"));
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let mut app = TestApp::sample();

    let response = app.add_to_cart("time-machine", 1).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_offsite_return_to_falls_back_to_cart() {
    let mut app = TestApp::sample();

    let response = app
        .post_form(
            "/cart/add",
            &[
                ("slug", "linen-shirt"),
                ("size", "M"),
                ("color", "Blue"),
                ("quantity", "1"),
                ("return_to", "//evil.example.com/phish"),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/cart"));
}

#[tokio::test]
async fn test_return_to_keeps_overlay_query() {
    let mut app = TestApp::sample();

    let response = app
        .post_form(
            "/cart/add",
            &[
                ("slug", "linen-shirt"),
                ("size", "M"),
                ("color", "Blue"),
                ("quantity", "1"),
                ("return_to", "/category/men?cart=1"),
            ],
        )
        .await;

    assert_eq!(response.location(), Some("/category/men?cart=1"));

    let page = app.get("/category/men?cart=1").await;
    assert!(page.body.contains("Shopping Cart"));
    assert!(page.body.contains("Proceed to Checkout"));
}

#[tokio::test]
async fn test_update_remove_and_totals() {
    let mut app = TestApp::sample();

    app.add_to_cart("linen-shirt", 1).await;
    let cart = app.get("/cart").await;
    assert!(cart.body.contains("$40.00"));

    let line = app.line_ids().await.remove(0);
    let response = app
        .post_form(
            "/cart/update",
            &[("line_id", line.as_str()), ("quantity", "3"), ("return_to", "/cart")],
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let cart = app.get("/cart").await;
    assert!(cart.body.contains("$120.00"));
    // 8% tax on $120.00 plus $15.00 shipping.
    assert!(cart.body.contains("$9.60"));
    assert!(cart.body.contains("$144.60"));

    app.post_form("/cart/remove", &[("line_id", line.as_str())]).await;

    let cart = app.get("/cart").await;
    assert!(cart.body.contains("Your cart is empty"));
    assert!(app.line_ids().await.is_empty());
}

#[tokio::test]
async fn test_quantity_zero_removes_the_line() {
    let mut app = TestApp::sample();

    app.add_to_cart("evening-dress", 1).await;
    let line = app.line_ids().await.remove(0);

    app.post_form("/cart/update", &[("line_id", line.as_str()), ("quantity", "0")])
        .await;

    assert!(app.line_ids().await.is_empty());
}

#[tokio::test]
async fn test_clear_empties_the_cart() {
    let mut app = TestApp::sample();

    app.add_to_cart("linen-shirt", 1).await;
    app.add_to_cart("evening-dress", 1).await;
    assert_eq!(app.line_ids().await.len(), 2);

    let response = app.post_form("/cart/clear", &[("return_to", "/")]).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/"));
    assert!(app.line_ids().await.is_empty());
}

#[tokio::test]
async fn test_malformed_line_id_is_rejected() {
    let mut app = TestApp::sample();

    let response = app
        .post_form("/cart/update", &[("line_id", "not-a-line"), ("quantity", "2")])
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_carts_are_per_visitor() {
    let mut alice = TestApp::sample();
    alice.add_to_cart("linen-shirt", 1).await;

    let mut bob = alice.new_visitor();
    let cart = bob.get("/cart").await;

    assert!(cart.body.contains("Your cart is empty"));
    assert_eq!(alice.line_ids().await.len(), 1);
}
