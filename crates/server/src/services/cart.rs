//! Cart service.
//!
//! Mutations load the user's snapshot, apply the change in memory, and write
//! the whole snapshot back. Two racing mutations for the same user can lose
//! an update (last write wins) — accepted for single-user-owned data.

use sqlx::PgPool;
use thiserror::Error;

use trellis_core::UserId;

use crate::db::{RepositoryError, UserRepository};
use crate::models::CartData;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The owning user record is missing.
    #[error("user not found")]
    UserNotFound,

    /// `set` was called for a (product, size) pair not in the cart.
    #[error("item or size not found in cart")]
    EntryNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Cart service.
pub struct CartService<'a> {
    users: UserRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Increment the quantity for `(product_id, size)` by one.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UserNotFound` if the user record is missing.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: &str,
        size: &str,
    ) -> Result<CartData, CartError> {
        let mut cart = self
            .users
            .get_cart(user_id)
            .await?
            .ok_or(CartError::UserNotFound)?;

        cart.add(product_id, size);
        self.write_back(user_id, &cart).await?;

        Ok(cart)
    }

    /// Overwrite the quantity for an existing cart entry.
    ///
    /// A quantity of zero removes the entry (and the product key once its
    /// last size is gone).
    ///
    /// # Errors
    ///
    /// Returns `CartError::UserNotFound` if the user record is missing.
    /// Returns `CartError::EntryNotFound` if the entry is not in the cart.
    pub async fn set(
        &self,
        user_id: UserId,
        product_id: &str,
        size: &str,
        quantity: u32,
    ) -> Result<CartData, CartError> {
        let mut cart = self
            .users
            .get_cart(user_id)
            .await?
            .ok_or(CartError::UserNotFound)?;

        if !cart.set(product_id, size, quantity) {
            return Err(CartError::EntryNotFound);
        }
        self.write_back(user_id, &cart).await?;

        Ok(cart)
    }

    /// Return the current cart snapshot.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UserNotFound` if the user record is missing.
    pub async fn get(&self, user_id: UserId) -> Result<CartData, CartError> {
        self.users
            .get_cart(user_id)
            .await?
            .ok_or(CartError::UserNotFound)
    }

    async fn write_back(&self, user_id: UserId, cart: &CartData) -> Result<(), CartError> {
        self.users.put_cart(user_id, cart).await.map_err(|e| match e {
            RepositoryError::NotFound => CartError::UserNotFound,
            other => CartError::Repository(other),
        })
    }
}
