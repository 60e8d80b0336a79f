//! Persisted-cart repository.
//!
//! Carts are created lazily on first add. `cart_items.sapling_id` carries no
//! foreign key: deleting a product leaves its cart rows behind, and reads
//! filter them out by inner-joining `saplings`.

use sqlx::SqlitePool;

use sapling_core::{CartId, ProductId, UserId};

use super::RepositoryError;
use crate::models::CartLine;

/// Repository for persisted cart operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the user's cart ID, if a cart exists.
    ///
    /// Reads and removals go through this: only the first add is allowed to
    /// create the cart row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find(&self, user_id: UserId) -> Result<Option<CartId>, RepositoryError> {
        let id: Option<i64> = sqlx::query_scalar("SELECT id FROM carts WHERE user_id = ?")
            .bind(user_id.as_i64())
            .fetch_optional(self.pool)
            .await?;

        Ok(id.map(CartId::new))
    }

    /// Get the user's cart ID, creating the cart if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn find_or_create(&self, user_id: UserId) -> Result<CartId, RepositoryError> {
        // Upsert keeps concurrent first-adds from racing on the UNIQUE(user_id).
        sqlx::query(
            "INSERT INTO carts (user_id) VALUES (?) ON CONFLICT(user_id) DO NOTHING",
        )
        .bind(user_id.as_i64())
        .execute(self.pool)
        .await?;

        let id: i64 = sqlx::query_scalar("SELECT id FROM carts WHERE user_id = ?")
            .bind(user_id.as_i64())
            .fetch_one(self.pool)
            .await?;

        Ok(CartId::new(id))
    }

    /// Add one unit of a product to the cart.
    ///
    /// Inserts a quantity-1 row, or atomically increments the existing row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn add_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO cart_items (cart_id, sapling_id, quantity) VALUES (?, ?, 1)
             ON CONFLICT(cart_id, sapling_id) DO UPDATE SET quantity = quantity + 1",
        )
        .bind(cart_id.as_i64())
        .bind(product_id.as_i64())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Overwrite the quantity of a cart line.
    ///
    /// A no-op when the product is not in the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_quantity(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE cart_items SET quantity = ? WHERE cart_id = ? AND sapling_id = ?",
        )
        .bind(quantity)
        .bind(cart_id.as_i64())
        .bind(product_id.as_i64())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Remove a product's line from the cart.
    ///
    /// A no-op when the product is not in the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = ? AND sapling_id = ?")
            .bind(cart_id.as_i64())
            .bind(product_id.as_i64())
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Remove every line from the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?")
            .bind(cart_id.as_i64())
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Read the cart lines with current product data.
    ///
    /// Lines whose product no longer exists are filtered by the inner join.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn snapshot_items(&self, cart_id: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows: Vec<(i64, String, f64, String, i64)> = sqlx::query_as(
            "SELECT s.id, s.name, s.price, s.image, ci.quantity
             FROM cart_items ci
             INNER JOIN saplings s ON s.id = ci.sapling_id
             WHERE ci.cart_id = ?
             ORDER BY ci.id ASC",
        )
        .bind(cart_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, price, image, quantity)| CartLine {
                product_id: ProductId::new(id),
                name,
                price,
                image,
                quantity,
            })
            .collect())
    }
}
