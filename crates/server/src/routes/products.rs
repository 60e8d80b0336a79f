//! Catalog route handlers: public reads, admin writes, bulk import.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use sapling_core::{CategoryId, ProductId, Season};

use crate::db::{CategoryRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAdmin;
use crate::models::{NewProduct, Product, ProductFilter};
use crate::services::import;
use crate::state::AppState;

/// Raw listing query parameters, as the client sends them.
///
/// Multi-value fields arrive as comma-separated strings (`categoryIds=1,2`,
/// `seasons=Spring,Fall`); `season` is the single-value spelling kept for
/// older clients.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub category_ids: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub season: Option<String>,
    pub seasons: Option<String>,
    pub search: Option<String>,
    pub featured: Option<String>,
    pub limit: Option<usize>,
    pub include_unavailable: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> Result<ProductFilter> {
        let mut category_ids = Vec::new();
        if let Some(raw) = self.category_ids.as_deref() {
            for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                let id: i64 = token
                    .parse()
                    .map_err(|_| AppError::Validation(format!("Invalid category id: {token}")))?;
                category_ids.push(CategoryId::new(id));
            }
        }

        // `seasons` and the legacy `season` spelling are merged into one set.
        let mut seasons = Vec::new();
        for raw in [self.seasons.as_deref(), self.season.as_deref()]
            .into_iter()
            .flatten()
        {
            if raw.eq_ignore_ascii_case("all") {
                continue;
            }
            let parsed = Season::parse_set(raw)
                .map_err(|e| AppError::Validation(e.to_string()))?;
            for season in parsed {
                if !seasons.contains(&season) {
                    seasons.push(season);
                }
            }
        }

        Ok(ProductFilter {
            category_ids,
            min_price: self.min_price,
            max_price: self.max_price,
            seasons,
            search: self.search.filter(|s| !s.trim().is_empty()),
            include_unavailable: self.include_unavailable.as_deref() == Some("true"),
            featured: (self.featured.as_deref() == Some("true")).then_some(true),
            // A zero limit means no limit, same as leaving it off.
            limit: self.limit.filter(|&limit| limit > 0),
        })
    }
}

/// Product create/replace request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductBody {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub season: Vec<String>,
    pub availability: Option<bool>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub reviews: i64,
}

impl ProductBody {
    /// Validate the body and resolve its category name against the store.
    async fn into_new_product(self, state: &AppState) -> Result<NewProduct> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Name and price are required".to_owned()));
        }
        if self.price < 0.0 {
            return Err(AppError::Validation("Price cannot be negative".to_owned()));
        }
        if self.category.trim().is_empty() {
            return Err(AppError::Validation("Category is required".to_owned()));
        }

        let mut season = Vec::new();
        for raw in &self.season {
            for parsed in
                Season::parse_set(raw).map_err(|e| AppError::Validation(e.to_string()))?
            {
                if !season.contains(&parsed) {
                    season.push(parsed);
                }
            }
        }

        // Name and id are written together from the one resolved category.
        let category = CategoryRepository::new(state.pool())
            .find_by_name(self.category.trim())
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_owned()))?;

        Ok(NewProduct {
            name: self.name.trim().to_owned(),
            price: self.price,
            description: self.description,
            category: category.name,
            category_id: Some(category.id),
            image: self.image,
            season,
            availability: self.availability.unwrap_or(true),
            featured: self.featured,
            rating: self.rating,
            reviews: self.reviews,
        })
    }
}

/// GET /products - list the catalog through the filter.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>> {
    let filter = query.into_filter()?;
    let products = ProductRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(products))
}

/// GET /products/{id} - product detail.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))
}

/// POST /products - create a product (admin).
#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<ProductBody>,
) -> Result<Response> {
    let new = body.into_new_product(&state).await?;
    let product = ProductRepository::new(state.pool()).create(&new).await?;

    tracing::info!(product_id = %product.id, "Product created");

    Ok((StatusCode::CREATED, Json(product)).into_response())
}

/// PUT /products/{id} - replace a product (admin).
#[tracing::instrument(skip_all, fields(product_id = id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i64>,
    Json(body): Json<ProductBody>,
) -> Result<Json<Product>> {
    let new = body.into_new_product(&state).await?;
    let product = ProductRepository::new(state.pool())
        .update(ProductId::new(id), &new)
        .await?;

    Ok(Json(product))
}

/// DELETE /products/{id} - delete a product (admin).
///
/// Cart rows referencing the product are left behind; cart reads filter them.
#[tracing::instrument(skip_all, fields(product_id = id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await?;

    tracing::info!("Product deleted");

    Ok(Json(json!({ "success": true })))
}

/// POST /products/bulk-upload - import a CSV of products (admin).
///
/// Rows succeed or fail independently; the response accounts for every row.
#[tracing::instrument(skip_all)]
pub async fn bulk_upload(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    mut multipart: Multipart,
) -> Result<Json<import::ImportOutcome>> {
    let mut file: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(e.to_string()))?;
            file = Some(bytes.to_vec());
            break;
        }
    }

    let Some(bytes) = file else {
        return Err(AppError::Validation("No file provided".to_owned()));
    };

    let outcome = import::import_csv(state.pool(), &bytes).await?;

    if outcome.processed == 0 {
        return Err(AppError::Validation("No data found in the file".to_owned()));
    }

    tracing::info!(
        processed = outcome.processed,
        succeeded = outcome.succeeded.len(),
        failed = outcome.failed.len(),
        "Bulk import finished"
    );

    Ok(Json(outcome))
}
