//! Cart route handlers.
//!
//! Every endpoint here requires a session: the anonymous cart lives on the
//! client and never reaches the server. After login the client throws its
//! local cart away and these endpoints become the cart.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::json;

use sapling_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireUser;
use crate::models::CartSnapshot;
use crate::services::cart::{CartBackend, ProductRef};
use crate::state::AppState;

/// Body naming a product line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIdBody {
    pub product_id: i64,
}

/// Body for overwriting a line quantity.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityBody {
    pub product_id: i64,
    pub quantity: i64,
}

fn backend(state: &AppState, user: &RequireUser) -> CartBackend {
    CartBackend::for_user(state.pool().clone(), user.0.id)
}

/// GET /cart - snapshot with totals recomputed from the lines.
pub async fn snapshot(
    State(state): State<AppState>,
    user: RequireUser,
) -> Result<Json<CartSnapshot>> {
    let snapshot = backend(&state, &user).snapshot().await?;
    Ok(Json(snapshot))
}

/// POST /cart/add - add one unit of a product.
#[tracing::instrument(skip_all, fields(user_id = %user.0.id, product_id = body.product_id))]
pub async fn add(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<ProductIdBody>,
) -> Result<Json<serde_json::Value>> {
    let product_id = ProductId::new(body.product_id);

    let product = ProductRepository::new(state.pool())
        .get(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    let mut cart = backend(&state, &user);
    cart.add_item(&ProductRef {
        id: product.id,
        name: product.name,
        price: product.price,
        image: product.image,
    })
    .await?;

    Ok(Json(json!({ "success": true })))
}

/// PUT /cart/update - overwrite a line quantity; below 1 removes the line.
#[tracing::instrument(skip_all, fields(user_id = %user.0.id, product_id = body.product_id))]
pub async fn update(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<QuantityBody>,
) -> Result<Json<serde_json::Value>> {
    let mut cart = backend(&state, &user);
    cart.set_quantity(ProductId::new(body.product_id), body.quantity)
        .await?;

    Ok(Json(json!({ "success": true })))
}

/// DELETE /cart/remove - remove a line. Succeeds when the line is absent.
#[tracing::instrument(skip_all, fields(user_id = %user.0.id, product_id = body.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<ProductIdBody>,
) -> Result<Json<serde_json::Value>> {
    let mut cart = backend(&state, &user);
    cart.remove_item(ProductId::new(body.product_id)).await?;

    Ok(Json(json!({ "success": true })))
}

/// DELETE /cart/clear - empty the cart.
#[tracing::instrument(skip_all, fields(user_id = %user.0.id))]
pub async fn clear(
    State(state): State<AppState>,
    user: RequireUser,
) -> Result<Json<serde_json::Value>> {
    let mut cart = backend(&state, &user);
    cart.clear().await?;

    Ok(Json(json!({ "success": true })))
}
