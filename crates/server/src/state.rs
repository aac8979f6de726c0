//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::events::OrderEvents;
use crate::services::auth::TokenSigner;
use crate::services::stripe::{StripeClient, StripeError};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; provides access to the connection pool,
/// configuration, token signer, Stripe client, and the order event publisher.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    signer: TokenSigner,
    stripe: StripeClient,
    events: OrderEvents,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Stripe HTTP client cannot be built.
    pub fn new(config: ServerConfig, pool: PgPool) -> Result<Self, StripeError> {
        let signer = TokenSigner::new(&config.jwt_secret);
        let stripe = StripeClient::new(&config.stripe)?;
        let events = OrderEvents::new();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                signer,
                stripe,
                events,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the bearer-token signer.
    #[must_use]
    pub fn signer(&self) -> &TokenSigner {
        &self.inner.signer
    }

    /// Get a reference to the Stripe Checkout client.
    #[must_use]
    pub fn stripe(&self) -> &StripeClient {
        &self.inner.stripe
    }

    /// Get a reference to the order event publisher.
    #[must_use]
    pub fn events(&self) -> &OrderEvents {
        &self.inner.events
    }
}
