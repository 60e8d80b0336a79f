//! Product ("sapling") model and listing filter.

use chrono::{DateTime, Utc};
use serde::Serialize;

use sapling_core::{CategoryId, ProductId, Season};

/// A sellable catalog item.
///
/// `category` is the denormalized category name; `category_id` is the
/// relation. Both are written together from one resolved category, so they
/// always agree. `category_id` is only `None` for bulk-imported rows that
/// carried no category at all.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    pub category_id: Option<CategoryId>,
    pub image: String,
    pub season: Vec<Season>,
    pub availability: bool,
    pub featured: bool,
    pub rating: f64,
    pub reviews: i64,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating or replacing a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    pub category_id: Option<CategoryId>,
    pub image: String,
    pub season: Vec<Season>,
    pub availability: bool,
    pub featured: bool,
    pub rating: f64,
    pub reviews: i64,
}

/// Listing filter for the catalog.
///
/// Multi-value selections within one field combine with OR; the fields
/// themselves combine with AND (AND-of-ORs). Empty vectors and `None`
/// mean "no restriction" for that field.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Match products in ANY of these categories.
    pub category_ids: Vec<CategoryId>,
    /// Inclusive lower price bound.
    pub min_price: Option<f64>,
    /// Inclusive upper price bound.
    pub max_price: Option<f64>,
    /// Match products whose season set intersects this set.
    pub seasons: Vec<Season>,
    /// Case-insensitive substring match against name OR description.
    pub search: Option<String>,
    /// When false (the default), only available products are returned.
    pub include_unavailable: bool,
    /// Restrict to featured / non-featured products.
    pub featured: Option<bool>,
    /// Cap on result count, applied after all other filtering.
    pub limit: Option<usize>,
}
