//! Category route handlers: public reads, admin writes.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use sapling_core::CategoryId;

use crate::db::CategoryRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAdmin;
use crate::models::Category;
use crate::state::AppState;

/// Category create/rename request body.
#[derive(Debug, Deserialize)]
pub struct CategoryBody {
    pub name: String,
}

impl CategoryBody {
    fn trimmed_name(&self) -> Result<&str> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Category name is required".to_owned()));
        }
        Ok(name)
    }
}

/// GET /categories - list all categories by name.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(categories))
}

/// GET /categories/{id} - category detail.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Category>> {
    CategoryRepository::new(state.pool())
        .get(CategoryId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Category not found".to_owned()))
}

/// POST /categories - create a category (admin).
#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<CategoryBody>,
) -> Result<Response> {
    let name = body.trimmed_name()?;
    let category = CategoryRepository::new(state.pool()).create(name).await?;

    tracing::info!(category_id = %category.id, "Category created");

    Ok((StatusCode::CREATED, Json(category)).into_response())
}

/// PUT /categories/{id} - rename a category (admin).
///
/// The denormalized name on products is not rewritten here; products keep
/// the name they were saved with until their next update.
#[tracing::instrument(skip_all, fields(category_id = id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i64>,
    Json(body): Json<CategoryBody>,
) -> Result<Json<Category>> {
    let name = body.trimmed_name()?;
    let category = CategoryRepository::new(state.pool())
        .rename(CategoryId::new(id), name)
        .await?;

    Ok(Json(category))
}

/// DELETE /categories/{id} - delete a category unless a product uses it (admin).
#[tracing::instrument(skip_all, fields(category_id = id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let repo = CategoryRepository::new(state.pool());
    let id = CategoryId::new(id);

    if repo.in_use(id).await? {
        return Err(AppError::Conflict(
            "Cannot delete category that is in use by products".to_owned(),
        ));
    }

    repo.delete(id).await?;

    tracing::info!("Category deleted");

    Ok(Json(json!({ "success": true })))
}
