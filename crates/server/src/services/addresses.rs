//! Address book service.

use sqlx::PgPool;
use thiserror::Error;

use trellis_core::{AddressId, UserId};

use crate::db::{AddressRepository, RepositoryError, UserRepository};
use crate::models::{Address, AddressPatch, MissingAddressField};

/// Errors from address book operations.
#[derive(Debug, Error)]
pub enum AddressError {
    /// The owning user record is missing.
    #[error("user not found")]
    UserNotFound,

    /// No such address under that user.
    #[error("address not found")]
    NotFound,

    /// A required field was missing or empty.
    #[error(transparent)]
    MissingField(#[from] MissingAddressField),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Address book service.
pub struct AddressBookService<'a> {
    users: UserRepository<'a>,
    addresses: AddressRepository<'a>,
}

impl<'a> AddressBookService<'a> {
    /// Create a new address book service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            addresses: AddressRepository::new(pool),
        }
    }

    /// List the user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::UserNotFound` if the user record is missing.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Address>, AddressError> {
        self.ensure_user(user_id).await?;
        Ok(self.addresses.list(user_id).await?)
    }

    /// Append a new address. All fields except `state` are required.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::MissingField` if a required field is absent or
    /// empty. Returns `AddressError::UserNotFound` if the user is missing.
    pub async fn add(&self, user_id: UserId, patch: AddressPatch) -> Result<Address, AddressError> {
        let fields = patch.into_validated()?;

        self.addresses
            .insert(user_id, &fields)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AddressError::UserNotFound,
                other => AddressError::Repository(other),
            })
    }

    /// Apply a partial update, leaving absent fields untouched.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::NotFound` if the address id does not exist
    /// under that user.
    pub async fn update(
        &self,
        user_id: UserId,
        address_id: AddressId,
        patch: AddressPatch,
    ) -> Result<Address, AddressError> {
        let existing = self
            .addresses
            .get(user_id, address_id)
            .await?
            .ok_or(AddressError::NotFound)?;

        let fields = patch.apply_to(existing.fields);

        self.addresses
            .update(user_id, address_id, &fields)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AddressError::NotFound,
                other => AddressError::Repository(other),
            })
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::NotFound` if the address id does not exist
    /// under that user.
    pub async fn delete(&self, user_id: UserId, address_id: AddressId) -> Result<(), AddressError> {
        self.addresses
            .delete(user_id, address_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AddressError::NotFound,
                other => AddressError::Repository(other),
            })
    }

    async fn ensure_user(&self, user_id: UserId) -> Result<(), AddressError> {
        self.users
            .get_by_id(user_id)
            .await?
            .map(|_| ())
            .ok_or(AddressError::UserNotFound)
    }
}
