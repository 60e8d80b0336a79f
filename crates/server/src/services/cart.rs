//! Cart backends and the login/logout transitions between them.
//!
//! A session is backed by exactly one of two carts: a client-held local cart
//! while anonymous, or the user's persisted cart after login. Both expose the
//! same five operations; which one is live is decided per request from the
//! resolved session, never both at once.
//!
//! Logging in discards whatever the local cart held and switches to the
//! persisted cart as-is. Logging out switches to a fresh empty local cart.

use sqlx::SqlitePool;

use sapling_core::{ProductId, UserId};

use crate::db::{CartRepository, ProductRepository, RepositoryError};
use crate::models::{CartLine, CartSnapshot};

/// What the display layer holds for a product it wants to add.
///
/// The persisted backend uses only `id` (and validates it against the
/// catalog); the local backend stores the whole denormalized entry without
/// validating anything.
#[derive(Debug, Clone)]
pub struct ProductRef {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub image: String,
}

/// Client-held cart for anonymous sessions.
///
/// Entries are denormalized copies of product data taken at add time; nothing
/// here touches the store, so entries are never validated and a later product
/// deletion leaves them showing stale data.
#[derive(Debug, Clone, Default)]
pub struct LocalCart {
    items: Vec<CartLine>,
}

impl LocalCart {
    /// An empty local cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn add_item(&mut self, product: &ProductRef) {
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.product_id == product.id)
        {
            line.quantity += 1;
        } else {
            self.items.push(CartLine {
                product_id: product.id,
                name: product.name.clone(),
                price: product.price,
                image: product.image.clone(),
                quantity: 1,
            });
        }
    }

    fn remove_item(&mut self, product_id: ProductId) {
        self.items.retain(|line| line.product_id != product_id);
    }

    fn set_quantity(&mut self, product_id: ProductId, quantity: i64) {
        if quantity < 1 {
            self.remove_item(product_id);
            return;
        }
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.product_id == product_id)
        {
            line.quantity = quantity;
        }
    }

    fn clear(&mut self) {
        self.items.clear();
    }

    fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::from_items(self.items.clone())
    }
}

/// The cart backing a session.
pub enum CartBackend {
    /// Anonymous session: client-held cart.
    Local(LocalCart),
    /// Authenticated session: persisted cart.
    Remote { pool: SqlitePool, user_id: UserId },
}

impl CartBackend {
    /// Backend for a fresh anonymous session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::Local(LocalCart::new())
    }

    /// Backend for a request whose session already resolved to a user.
    #[must_use]
    pub fn for_user(pool: SqlitePool, user_id: UserId) -> Self {
        Self::anonymous().login(pool, user_id)
    }

    /// Transition into an authenticated session.
    ///
    /// The local cart, if any, is discarded: the persisted cart is taken
    /// as-is, with no merge of anonymous picks.
    #[must_use]
    pub fn login(self, pool: SqlitePool, user_id: UserId) -> Self {
        Self::Remote { pool, user_id }
    }

    /// Transition into an anonymous session with an empty cart.
    #[must_use]
    pub fn logout(self) -> Self {
        Self::anonymous()
    }

    /// Add one unit of a product, upserting the line.
    ///
    /// # Errors
    ///
    /// Remote only: `RepositoryError::NotFound` when the product does not
    /// exist in the catalog. The local backend accepts anything.
    pub async fn add_item(&mut self, product: &ProductRef) -> Result<(), RepositoryError> {
        match self {
            Self::Local(cart) => {
                cart.add_item(product);
                Ok(())
            }
            Self::Remote { pool, user_id } => {
                if !ProductRepository::new(pool).exists(product.id).await? {
                    return Err(RepositoryError::NotFound);
                }
                let carts = CartRepository::new(pool);
                let cart_id = carts.find_or_create(*user_id).await?;
                carts.add_item(cart_id, product.id).await
            }
        }
    }

    /// Remove a product's line entirely. Succeeds when absent.
    ///
    /// # Errors
    ///
    /// Remote only: store failures.
    pub async fn remove_item(&mut self, product_id: ProductId) -> Result<(), RepositoryError> {
        match self {
            Self::Local(cart) => {
                cart.remove_item(product_id);
                Ok(())
            }
            Self::Remote { pool, user_id } => {
                let carts = CartRepository::new(pool);
                // No cart yet means nothing to remove.
                let Some(cart_id) = carts.find(*user_id).await? else {
                    return Ok(());
                };
                carts.remove_item(cart_id, product_id).await
            }
        }
    }

    /// Overwrite a line's quantity; any quantity below 1 removes the line.
    ///
    /// # Errors
    ///
    /// Remote only: store failures.
    pub async fn set_quantity(
        &mut self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(), RepositoryError> {
        match self {
            Self::Local(cart) => {
                cart.set_quantity(product_id, quantity);
                Ok(())
            }
            Self::Remote { pool, user_id } => {
                let carts = CartRepository::new(pool);
                let Some(cart_id) = carts.find(*user_id).await? else {
                    return Ok(());
                };
                if quantity < 1 {
                    carts.remove_item(cart_id, product_id).await
                } else {
                    carts.set_quantity(cart_id, product_id, quantity).await
                }
            }
        }
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Remote only: store failures.
    pub async fn clear(&mut self) -> Result<(), RepositoryError> {
        match self {
            Self::Local(cart) => {
                cart.clear();
                Ok(())
            }
            Self::Remote { pool, user_id } => {
                let carts = CartRepository::new(pool);
                let Some(cart_id) = carts.find(*user_id).await? else {
                    return Ok(());
                };
                carts.clear(cart_id).await
            }
        }
    }

    /// Read the cart with totals recomputed from the lines.
    ///
    /// The persisted backend joins current product data, so lines whose
    /// product was deleted disappear from the read; the local backend returns
    /// its entries as stored.
    ///
    /// # Errors
    ///
    /// Remote only: store failures.
    pub async fn snapshot(&self) -> Result<CartSnapshot, RepositoryError> {
        match self {
            Self::Local(cart) => Ok(cart.snapshot()),
            Self::Remote { pool, user_id } => {
                let carts = CartRepository::new(pool);
                // The cart is created lazily on the first add; a read must
                // not bring it into existence.
                let Some(cart_id) = carts.find(*user_id).await? else {
                    return Ok(CartSnapshot::empty());
                };
                let items = carts.snapshot_items(cart_id).await?;
                Ok(CartSnapshot::from_items(items))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fern() -> ProductRef {
        ProductRef {
            id: ProductId::new(1),
            name: "Boston Fern".to_owned(),
            price: 12.5,
            image: "/fern.jpg".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_local_add_twice_increments_one_line() {
        let mut cart = CartBackend::anonymous();
        cart.add_item(&fern()).await.unwrap();
        cart.add_item(&fern()).await.unwrap();

        let snapshot = cart.snapshot().await.unwrap();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].quantity, 2);
        assert_eq!(snapshot.total_items, 2);
        assert!((snapshot.total_price - 25.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_local_set_quantity_zero_removes() {
        let mut cart = CartBackend::anonymous();
        cart.add_item(&fern()).await.unwrap();
        cart.set_quantity(ProductId::new(1), 0).await.unwrap();

        let snapshot = cart.snapshot().await.unwrap();
        assert!(snapshot.items.is_empty());
    }

    #[tokio::test]
    async fn test_local_remove_absent_is_noop() {
        let mut cart = CartBackend::anonymous();
        cart.remove_item(ProductId::new(99)).await.unwrap();
        assert!(cart.snapshot().await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_local_add_does_not_validate() {
        // The local backend takes the caller's word for the product.
        let mut cart = CartBackend::anonymous();
        cart.add_item(&ProductRef {
            id: ProductId::new(424_242),
            name: "Ghost Plant".to_owned(),
            price: 3.0,
            image: String::new(),
        })
        .await
        .unwrap();
        assert_eq!(cart.snapshot().await.unwrap().total_items, 1);
    }

    #[tokio::test]
    async fn test_logout_yields_empty_local_cart() {
        let mut cart = CartBackend::anonymous();
        cart.add_item(&fern()).await.unwrap();
        let cart = cart.logout();
        assert!(cart.snapshot().await.unwrap().items.is_empty());
    }
}
