//! Bulk CSV import: partial success with per-row accounting.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{json_body, spawn_app};

const CSV_CONTENT_TYPE: &str = "text/csv";

async fn upload(app: &common::TestApp, cookie: &str, csv: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .send_file(
            "/products/bulk-upload",
            "products.csv",
            CSV_CONTENT_TYPE,
            csv.as_bytes(),
            Some(cookie),
        )
        .await;
    let status = response.status();
    (status, json_body(response).await)
}

#[tokio::test]
async fn bulk_upload_requires_admin() {
    let app = spawn_app().await;
    let customer = app.customer_cookie().await;

    let response = app
        .send_file(
            "/products/bulk-upload",
            "products.csv",
            CSV_CONTENT_TYPE,
            b"name,price\nOak,30",
            Some(&customer),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn rows_are_numbered_from_two() {
    let app = spawn_app().await;
    let admin = app.admin_cookie().await;

    let (status, body) = upload(&app, &admin, "name,price\nOak,30\nBasil,4\n").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["processed"], 2);
    let succeeded = body["succeeded"].as_array().expect("succeeded");
    assert_eq!(succeeded.len(), 2);
    // Header is row 1, so the first data row reports as row 2.
    assert_eq!(succeeded[0]["row"], 2);
    assert_eq!(succeeded[0]["name"], "Oak");
    assert_eq!(succeeded[1]["row"], 3);
}

#[tokio::test]
async fn bad_rows_fail_alone_and_the_rest_import() {
    let app = spawn_app().await;
    let admin = app.admin_cookie().await;
    app.create_category(&admin, "Trees").await;

    let csv = "name,price,season,category\n\
               Oak,30,Spring,Trees\n\
               ,5,,\n\
               Mystery,free,,\n\
               Monsoon Plant,4,Monsoon,\n\
               Lost,8,,Nowhere\n\
               Basil,4,,\n";
    let (status, body) = upload(&app, &admin, csv).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["processed"], 6);
    let succeeded = body["succeeded"].as_array().expect("succeeded");
    let failed = body["failed"].as_array().expect("failed");
    assert_eq!(succeeded.len(), 2);
    assert_eq!(failed.len(), 4);

    // Missing name, bad price, unknown season, unknown category - in order.
    assert_eq!(failed[0]["row"], 3);
    assert_eq!(failed[1]["row"], 4);
    assert_eq!(failed[2]["row"], 5);
    assert_eq!(failed[3]["row"], 6);
    assert_eq!(failed[3]["name"], "Lost");

    // The successes really are in the catalog (unavailable rows included).
    let listing = app.get("/products?includeUnavailable=true", None).await;
    assert_eq!(
        json_body(listing).await.as_array().expect("array").len(),
        2
    );
}

#[tokio::test]
async fn availability_defaults_to_true_and_category_links_by_name() {
    let app = spawn_app().await;
    let admin = app.admin_cookie().await;
    let trees = app.create_category(&admin, "Trees").await;

    let csv = "name,price,availability,category\n\
               Oak,30,,trees\n\
               Holly,15,false,\n";
    let (status, body) = upload(&app, &admin, csv).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["succeeded"].as_array().expect("succeeded").len(), 2);

    // Default listing hides the explicit false, shows the blank-availability row.
    let listing = json_body(app.get("/products", None).await).await;
    let visible = listing.as_array().expect("array");
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0]["name"], "Oak");
    // Category resolved case-insensitively to the canonical name and id.
    assert_eq!(visible[0]["category"], "Trees");
    assert_eq!(visible[0]["categoryId"], trees);
}

#[tokio::test]
async fn empty_file_is_a_validation_error() {
    let app = spawn_app().await;
    let admin = app.admin_cookie().await;

    let (status, body) = upload(&app, &admin, "name,price\n").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No data found in the file");
}

#[tokio::test]
async fn missing_file_field_is_a_validation_error() {
    let app = spawn_app().await;
    let admin = app.admin_cookie().await;

    let response = app
        .send_json("POST", "/products/bulk-upload", &json!({}), Some(&admin))
        .await;
    // Not multipart at all: rejected before the import runs.
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
