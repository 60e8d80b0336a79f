//! Cart snapshot models.

use serde::{Deserialize, Serialize};

use sapling_core::ProductId;

/// One line of a cart: a product reference with denormalized display data.
///
/// This is both the wire format of a cart read and the entry format of the
/// client-held guest cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: f64,
    pub image: String,
    pub quantity: i64,
}

/// A point-in-time view of a cart.
///
/// Totals are recomputed from the lines on every read; there is no cached
/// aggregate to keep consistent across writes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub items: Vec<CartLine>,
    pub total_items: i64,
    pub total_price: f64,
}

impl CartSnapshot {
    /// Build a snapshot from lines, computing both totals fresh.
    #[must_use]
    pub fn from_items(items: Vec<CartLine>) -> Self {
        let total_items = items.iter().map(|item| item.quantity).sum();
        let total_price = items
            .iter()
            .map(|item| item.price * item.quantity as f64)
            .sum();

        Self {
            items,
            total_items,
            total_price,
        }
    }

    /// An empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_items(Vec::new())
    }
}
