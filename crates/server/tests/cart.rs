//! Persisted-cart behavior through the HTTP surface, plus the local-cart
//! login transition.

mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use sapling_core::ProductId;
use sapling_server::services::cart::{CartBackend, ProductRef};

use common::{json_body, spawn_app};

async fn seeded_product(app: &common::TestApp, admin: &str, name: &str, price: f64) -> i64 {
    app.create_product(
        admin,
        json!({
            "name": name,
            "price": price,
            "category": "Trees",
            "season": [],
        }),
    )
    .await
}

async fn snapshot(app: &common::TestApp, cookie: &str) -> Value {
    let response = app.get("/cart", Some(cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await
}

#[tokio::test]
async fn cart_requires_a_session() {
    let app = spawn_app().await;

    assert_eq!(app.get("/cart", None).await.status(), StatusCode::UNAUTHORIZED);

    let add = app
        .send_json("POST", "/cart/add", &json!({ "productId": 1 }), None)
        .await;
    assert_eq!(add.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn adding_twice_increments_one_line() {
    let app = spawn_app().await;
    let admin = app.admin_cookie().await;
    app.create_category(&admin, "Trees").await;
    let oak = seeded_product(&app, &admin, "Oak", 30.0).await;
    let customer = app.customer_cookie().await;

    for _ in 0..2 {
        let response = app
            .send_json("POST", "/cart/add", &json!({ "productId": oak }), Some(&customer))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let cart = snapshot(&app, &customer).await;
    assert_eq!(cart["items"].as_array().expect("items").len(), 1);
    assert_eq!(cart["items"][0]["quantity"], 2);
    assert_eq!(cart["totalItems"], 2);
    assert_eq!(cart["totalPrice"], 60.0);
}

#[tokio::test]
async fn adding_an_unknown_product_is_not_found() {
    let app = spawn_app().await;
    let customer = app.customer_cookie().await;

    let response = app
        .send_json("POST", "/cart/add", &json!({ "productId": 999 }), Some(&customer))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn setting_quantity_to_zero_equals_remove() {
    let app = spawn_app().await;
    let admin = app.admin_cookie().await;
    app.create_category(&admin, "Trees").await;
    let oak = seeded_product(&app, &admin, "Oak", 30.0).await;
    let customer = app.customer_cookie().await;

    app.send_json("POST", "/cart/add", &json!({ "productId": oak }), Some(&customer))
        .await;

    let response = app
        .send_json(
            "PUT",
            "/cart/update",
            &json!({ "productId": oak, "quantity": 0 }),
            Some(&customer),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cart = snapshot(&app, &customer).await;
    assert!(cart["items"].as_array().expect("items").is_empty());
    assert_eq!(cart["totalItems"], 0);
}

#[tokio::test]
async fn update_overwrites_quantity_and_totals_follow() {
    let app = spawn_app().await;
    let admin = app.admin_cookie().await;
    app.create_category(&admin, "Trees").await;
    let oak = seeded_product(&app, &admin, "Oak", 30.0).await;
    let basil = seeded_product(&app, &admin, "Basil", 4.0).await;
    let customer = app.customer_cookie().await;

    app.send_json("POST", "/cart/add", &json!({ "productId": oak }), Some(&customer))
        .await;
    app.send_json("POST", "/cart/add", &json!({ "productId": basil }), Some(&customer))
        .await;
    app.send_json(
        "PUT",
        "/cart/update",
        &json!({ "productId": oak, "quantity": 3 }),
        Some(&customer),
    )
    .await;

    let cart = snapshot(&app, &customer).await;
    assert_eq!(cart["totalItems"], 4);
    assert_eq!(cart["totalPrice"], 94.0);
}

#[tokio::test]
async fn reads_do_not_create_a_cart_row() {
    let app = spawn_app().await;
    let customer = app.customer_cookie().await;

    // Reading, removing and clearing before any add must all succeed
    // without materializing a cart.
    let cart = snapshot(&app, &customer).await;
    assert!(cart["items"].as_array().expect("items").is_empty());
    assert_eq!(cart["totalItems"], 0);
    assert_eq!(cart["totalPrice"], 0.0);

    app.send_json("DELETE", "/cart/remove", &json!({ "productId": 1 }), Some(&customer))
        .await;
    app.send_json("DELETE", "/cart/clear", &json!({}), Some(&customer))
        .await;

    let carts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM carts")
        .fetch_one(&app.pool)
        .await
        .expect("cart count");
    assert_eq!(carts, 0);
}

#[tokio::test]
async fn first_add_creates_the_cart_row() {
    let app = spawn_app().await;
    let admin = app.admin_cookie().await;
    app.create_category(&admin, "Trees").await;
    let oak = seeded_product(&app, &admin, "Oak", 30.0).await;
    let customer = app.customer_cookie().await;

    app.send_json("POST", "/cart/add", &json!({ "productId": oak }), Some(&customer))
        .await;

    let carts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM carts")
        .fetch_one(&app.pool)
        .await
        .expect("cart count");
    assert_eq!(carts, 1);
}

#[tokio::test]
async fn removing_an_absent_line_succeeds() {
    let app = spawn_app().await;
    let customer = app.customer_cookie().await;

    let response = app
        .send_json("DELETE", "/cart/remove", &json!({ "productId": 7 }), Some(&customer))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn clear_empties_the_cart() {
    let app = spawn_app().await;
    let admin = app.admin_cookie().await;
    app.create_category(&admin, "Trees").await;
    let oak = seeded_product(&app, &admin, "Oak", 30.0).await;
    let customer = app.customer_cookie().await;

    app.send_json("POST", "/cart/add", &json!({ "productId": oak }), Some(&customer))
        .await;
    let response = app
        .send_json("DELETE", "/cart/clear", &json!({}), Some(&customer))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cart = snapshot(&app, &customer).await;
    assert!(cart["items"].as_array().expect("items").is_empty());
}

#[tokio::test]
async fn deleted_products_vanish_from_cart_reads() {
    let app = spawn_app().await;
    let admin = app.admin_cookie().await;
    app.create_category(&admin, "Trees").await;
    let oak = seeded_product(&app, &admin, "Oak", 30.0).await;
    let basil = seeded_product(&app, &admin, "Basil", 4.0).await;
    let customer = app.customer_cookie().await;

    app.send_json("POST", "/cart/add", &json!({ "productId": oak }), Some(&customer))
        .await;
    app.send_json("POST", "/cart/add", &json!({ "productId": basil }), Some(&customer))
        .await;

    // Product deletion succeeds even though a cart references it.
    let deleted = app
        .send_json("DELETE", &format!("/products/{oak}"), &json!({}), Some(&admin))
        .await;
    assert_eq!(deleted.status(), StatusCode::OK);

    let cart = snapshot(&app, &customer).await;
    let items = cart["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Basil");
    assert_eq!(cart["totalPrice"], 4.0);
}

#[tokio::test]
async fn login_discards_the_local_cart() {
    let app = spawn_app().await;
    let admin = app.admin_cookie().await;
    app.create_category(&admin, "Trees").await;
    let oak = seeded_product(&app, &admin, "Oak", 30.0).await;
    let customer = app.customer_cookie().await;

    // The user put something in the persisted cart earlier.
    app.send_json("POST", "/cart/add", &json!({ "productId": oak }), Some(&customer))
        .await;

    // Browsing anonymously, they fill a local cart with other things.
    let mut local = CartBackend::anonymous();
    local
        .add_item(&ProductRef {
            id: ProductId::new(12345),
            name: "Window-sill Cactus".to_owned(),
            price: 3.0,
            image: String::new(),
        })
        .await
        .expect("local add");

    // Logging in switches to the persisted cart; the local picks are gone.
    let user_id = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?")
        .bind("customer@example.com")
        .fetch_one(&app.pool)
        .await
        .expect("user id");
    let logged_in = local.login(app.pool.clone(), user_id.into());

    let merged = logged_in.snapshot().await.expect("snapshot");
    assert_eq!(merged.items.len(), 1);
    assert_eq!(merged.items[0].name, "Oak");
}
