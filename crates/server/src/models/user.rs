//! User model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use sapling_core::{Email, Role, UserId};

/// A shop account.
///
/// The password hash is never part of this struct; it is fetched separately
/// by the auth service and never serialized into a response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}
