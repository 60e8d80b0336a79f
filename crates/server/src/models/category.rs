//! Category model.

use serde::Serialize;

use sapling_core::CategoryId;

/// A catalog category.
///
/// Names are unique case-insensitively. A category cannot be deleted while
/// any product references it; that check lives in the category repository.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}
