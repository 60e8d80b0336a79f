//! HTTP route handlers for the shop.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings the store)
//!
//! # Auth
//! POST /auth/register          - Create a customer account
//! POST /auth/login             - Login, sets the session cookie
//! GET  /auth/logout            - Logout, clears the session cookie
//! POST /auth/logout            - Same, for callers that prefer POST
//! GET  /auth/check             - Current identity for the session
//!
//! # Catalog (public reads, admin writes)
//! GET    /products             - Product listing with filters
//! POST   /products             - Create product (admin)
//! GET    /products/{id}        - Product detail
//! PUT    /products/{id}        - Replace product (admin)
//! DELETE /products/{id}        - Delete product (admin)
//! POST   /products/bulk-upload - CSV import, partial success (admin)
//! GET    /categories           - Category listing
//! POST   /categories           - Create category (admin)
//! GET    /categories/{id}      - Category detail
//! PUT    /categories/{id}      - Rename category (admin)
//! DELETE /categories/{id}      - Delete category, 400 when in use (admin)
//!
//! # Cart (requires auth; anonymous carts live on the client)
//! GET    /cart                 - Snapshot with fresh totals
//! POST   /cart/add             - Add one unit of a product
//! PUT    /cart/update          - Overwrite a line quantity
//! DELETE /cart/remove          - Remove a line
//! DELETE /cart/clear           - Empty the cart
//!
//! # Uploads
//! POST /upload                 - Forward an image to the image host (admin)
//! ```

pub mod auth;
pub mod cart;
pub mod categories;
pub mod products;
pub mod upload;

use axum::{
    Json,
    Router,
    extract::State,
    routing::{delete, get, post, put},
};
use serde_json::json;

use crate::error::Result;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout).post(auth::logout))
        .route("/check", get(auth::check))
}

/// Create the catalog routes router (products and bulk import).
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/bulk-upload", post(products::bulk_upload))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list).post(categories::create))
        .route(
            "/{id}",
            get(categories::get)
                .put(categories::update)
                .delete(categories::delete),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::snapshot))
        .route("/add", post(cart::add))
        .route("/update", put(cart::update))
        .route("/remove", delete(cart::remove))
        .route("/clear", delete(cart::clear))
}

/// Assemble the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(health_ready))
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/cart", cart_routes())
        .route("/upload", post(upload::upload))
        .with_state(state)
}

/// Liveness check.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness check: verifies the store answers.
async fn health_ready(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(state.pool())
        .await
        .map_err(crate::db::RepositoryError::from)?;

    Ok(Json(json!({ "status": "ready" })))
}
