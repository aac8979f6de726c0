//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Grant the admin role to a registered user
//! trellis-cli admin promote -e admin@example.com
//! ```
//!
//! The configured `TRELLIS_ADMIN_EMAIL`/`TRELLIS_ADMIN_PASSWORD` pair is the
//! bootstrap admin principal; promoting a real user row lets that account
//! carry the admin role as well.

use sqlx::PgPool;
use thiserror::Error;

use trellis_core::{Email, UserRole};
use trellis_server::db::{RepositoryError, UserRepository};

/// Errors that can occur during user management operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// No user registered under that email.
    #[error("No user found with email: {0}")]
    UserNotFound(String),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

/// Grant the admin role to an existing user.
///
/// # Errors
///
/// Returns `AdminError::UserNotFound` if no user is registered under the
/// email, or `AdminError::Database` if the connection fails.
pub async fn promote(email: &str) -> Result<(), AdminError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;

    let database_url = std::env::var("TRELLIS_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| AdminError::MissingEnvVar("TRELLIS_DATABASE_URL"))?;

    let pool = PgPool::connect(&database_url).await?;

    UserRepository::new(&pool)
        .set_role(&email, UserRole::Admin)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AdminError::UserNotFound(email.to_string()),
            other => AdminError::Repository(other),
        })?;

    tracing::info!(email = %email, "user promoted to admin");
    Ok(())
}
