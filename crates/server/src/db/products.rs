//! Product ("sapling") repository, including the catalog listing filter.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use sapling_core::{CategoryId, ProductId, Season};

use super::RepositoryError;
use crate::models::{NewProduct, Product, ProductFilter};

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    price: f64,
    description: String,
    category: String,
    category_id: Option<i64>,
    image: String,
    season: String,
    availability: bool,
    featured: bool,
    rating: f64,
    reviews: i64,
    created_at: DateTime<Utc>,
}

const PRODUCT_COLUMNS: &str = "id, name, price, description, category, category_id, \
     image, season, availability, featured, rating, reviews, created_at";

impl ProductRow {
    fn into_product(self) -> Result<Product, RepositoryError> {
        let season = Season::parse_set(&self.season).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid season list in database: {e}"))
        })?;

        Ok(Product {
            id: ProductId::new(self.id),
            name: self.name,
            price: self.price,
            description: self.description,
            category: self.category,
            category_id: self.category_id.map(CategoryId::new),
            image: self.image,
            season,
            availability: self.availability,
            featured: self.featured,
            rating: self.rating,
            reviews: self.reviews,
            created_at: self.created_at,
        })
    }
}

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List products matching a filter.
    ///
    /// Fields of the filter combine with AND; multi-value fields (categories,
    /// seasons) match with OR within themselves. Results come back newest
    /// first (`id DESC`), and `limit` caps the count after every other
    /// criterion has been applied.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM saplings WHERE 1=1"
        ));

        if !filter.include_unavailable {
            qb.push(" AND availability = 1");
        }

        if !filter.category_ids.is_empty() {
            qb.push(" AND category_id IN (");
            let mut separated = qb.separated(", ");
            for id in &filter.category_ids {
                separated.push_bind(id.as_i64());
            }
            separated.push_unseparated(")");
        }

        if let Some(min) = filter.min_price {
            qb.push(" AND price >= ").push_bind(min);
        }

        if let Some(max) = filter.max_price {
            qb.push(" AND price <= ").push_bind(max);
        }

        if let Some(search) = filter.search.as_deref() {
            let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
            qb.push(" AND (LOWER(name) LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR LOWER(description) LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }

        if let Some(featured) = filter.featured {
            qb.push(" AND featured = ").push_bind(featured);
        }

        qb.push(" ORDER BY id DESC");

        let rows: Vec<ProductRow> = qb.build_query_as().fetch_all(self.pool).await?;

        // Season matching works on the packed list column, so it (and the
        // limit, which applies after all filtering) happens here.
        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            let product = row.into_product()?;
            if Season::intersects(&product.season, &filter.seasons) {
                products.push(product);
            }
        }

        if let Some(limit) = filter.limit {
            products.truncate(limit);
        }

        Ok(products)
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM saplings WHERE id = ?"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Whether a product exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM saplings WHERE id = ?")
            .bind(id.as_i64())
            .fetch_one(self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO saplings
                (name, price, description, category, category_id, image, season,
                 availability, featured, rating, reviews)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new.name)
        .bind(new.price)
        .bind(&new.description)
        .bind(&new.category)
        .bind(new.category_id.map(|id| id.as_i64()))
        .bind(&new.image)
        .bind(Season::pack(&new.season))
        .bind(new.availability)
        .bind(new.featured)
        .bind(new.rating)
        .bind(new.reviews)
        .execute(self.pool)
        .await?;

        let id = ProductId::new(result.last_insert_rowid());
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(&self, id: ProductId, new: &NewProduct) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            "UPDATE saplings SET
                name = ?, price = ?, description = ?, category = ?, category_id = ?,
                image = ?, season = ?, availability = ?, featured = ?, rating = ?,
                reviews = ?
             WHERE id = ?",
        )
        .bind(&new.name)
        .bind(new.price)
        .bind(&new.description)
        .bind(&new.category)
        .bind(new.category_id.map(|id| id.as_i64()))
        .bind(&new.image)
        .bind(Season::pack(&new.season))
        .bind(new.availability)
        .bind(new.featured)
        .bind(new.rating)
        .bind(new.reviews)
        .bind(id.as_i64())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// Cart rows referencing the product are left in place; cart reads filter
    /// them out.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM saplings WHERE id = ?")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
