//! Database operations.
//!
//! # Tables
//!
//! - `users` - Credentials, role, and the JSONB cart snapshot
//! - `addresses` - Per-user shipping addresses (FK → users)
//! - `orders` - Placed orders with a denormalized JSONB address snapshot
//! - `order_items` - Line items copied at order time (FK → orders)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p trellis-cli -- migrate
//! ```
//!
//! Queries use the runtime `sqlx::query`/`query_as` API with `FromRow` row
//! structs; row structs are converted to domain types at the repository
//! boundary.

pub mod addresses;
pub mod orders;
pub mod users;

pub use addresses::AddressRepository;
pub use orders::OrderRepository;
pub use users::UserRepository;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
