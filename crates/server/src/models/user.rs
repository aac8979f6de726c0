//! User domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use trellis_core::{Email, UserId, UserRole};

/// A registered user (domain type).
///
/// The password hash never leaves the `db` layer; this type is what the
/// profile endpoint serializes, so it carries everything *except* the hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique email address.
    pub email: Email,
    /// Principal role.
    pub role: UserRole,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
