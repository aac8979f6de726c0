//! Order service.
//!
//! Converts a cart's worth of items plus a chosen-or-new address into a
//! persisted order, optionally opens a Stripe Checkout session, and emits
//! events through the injected [`OrderEvents`] publisher.
//!
//! Order persistence, cart clearing, and event publishing are separate
//! writes, not one transaction: if clearing the cart or publishing fails
//! after the order row is committed, the partial state is logged and left
//! for the client to recover from (refetch), never rolled back.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use trellis_core::{AddressId, OrderId, OrderStatus, OrderStatusError, PaymentMethod, UserId};

use crate::db::{AddressRepository, OrderRepository, RepositoryError, UserRepository};
use crate::events::{NewOrderPayload, OrderEvent, OrderEvents, OrderUpdatedPayload};
use crate::models::{
    AddressPatch, AddressSnapshot, AdminOrder, MissingAddressField, Order, OrderItem,
};
use crate::services::stripe::{StripeClient, StripeError};

/// Errors from order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The purchasing user record is missing.
    #[error("user not found")]
    UserNotFound,

    /// The referenced saved address does not exist under that user.
    #[error("address not found")]
    AddressNotFound,

    /// No such order.
    #[error("order not found")]
    OrderNotFound,

    /// A required inline-address field was missing or empty.
    #[error(transparent)]
    MissingField(#[from] MissingAddressField),

    /// Rejected status value or transition.
    #[error(transparent)]
    Status(#[from] OrderStatusError),

    /// Stripe session creation failed.
    #[error("stripe error: {0}")]
    Stripe(#[from] StripeError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// The address portion of an order-placement request: either a reference to
/// a saved address or the fields of a new one, inline.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSelector {
    /// Id of a saved address; when present, the inline fields are ignored.
    pub address_id: Option<AddressId>,
    /// Inline address fields for the new-address path.
    #[serde(flatten)]
    pub fields: AddressPatch,
}

/// Order service.
pub struct OrderService<'a> {
    users: UserRepository<'a>,
    addresses: AddressRepository<'a>,
    orders: OrderRepository<'a>,
    stripe: &'a StripeClient,
    events: &'a OrderEvents,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, stripe: &'a StripeClient, events: &'a OrderEvents) -> Self {
        Self {
            users: UserRepository::new(pool),
            addresses: AddressRepository::new(pool),
            orders: OrderRepository::new(pool),
            stripe,
            events,
        }
    }

    /// Place a cash-on-delivery order.
    ///
    /// Resolves the address, persists the order with its items, clears the
    /// purchaser's cart, and publishes a `newOrder` event.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::UserNotFound`/`AddressNotFound`/`MissingField`
    /// per the address-resolution rules.
    pub async fn place(
        &self,
        user_id: UserId,
        items: Vec<OrderItem>,
        amount: Decimal,
        address: AddressSelector,
    ) -> Result<Order, OrderError> {
        let (order, user_name) = self
            .create_order(user_id, items, amount, address, PaymentMethod::Cod)
            .await?;

        self.events.publish(OrderEvent::NewOrder(NewOrderPayload::from_order(
            &order, user_name,
        )));

        // COD orders settle the cart immediately; card orders wait for
        // payment verification.
        if let Err(e) = self.users.clear_cart(user_id).await {
            tracing::error!(order_id = %order.id, error = %e, "order placed but cart not cleared");
        }

        Ok(order)
    }

    /// Place a card-payment order and open a Stripe Checkout session.
    ///
    /// The cart is left untouched and the payment flag stays false until the
    /// processor callback lands in [`verify_payment`](Self::verify_payment).
    /// Returns the hosted session URL to redirect the customer to.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Stripe` if session creation fails; the order row
    /// remains (unpaid) in that case.
    pub async fn place_with_stripe(
        &self,
        user_id: UserId,
        items: Vec<OrderItem>,
        amount: Decimal,
        address: AddressSelector,
        origin: &str,
    ) -> Result<String, OrderError> {
        let (order, user_name) = self
            .create_order(user_id, items, amount, address, PaymentMethod::Stripe)
            .await?;

        self.events.publish(OrderEvent::NewOrder(NewOrderPayload::from_order(
            &order, user_name,
        )));

        let session_url = self
            .stripe
            .create_checkout_session(order.id, &order.items, origin)
            .await
            .map_err(|e| {
                tracing::error!(order_id = %order.id, error = %e, "checkout session creation failed");
                e
            })?;

        Ok(session_url)
    }

    /// Settle a card-payment order after the processor callback.
    ///
    /// On success the order is marked paid, an `orderUpdated` event is
    /// published, and the purchaser's cart is cleared. On failure the order
    /// is deleted outright. Returns whether the order ended up paid.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` if the order id does not resolve.
    pub async fn verify_payment(&self, order_id: OrderId, success: bool) -> Result<bool, OrderError> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)?;

        if success {
            self.orders.set_payment(order_id, true).await?;

            self.events
                .publish(OrderEvent::OrderUpdated(OrderUpdatedPayload {
                    order_id,
                    status: order.status,
                    payment: true,
                }));

            if let Err(e) = self.users.clear_cart(order.user_id).await {
                tracing::error!(%order_id, error = %e, "payment verified but cart not cleared");
            }

            Ok(true)
        } else {
            self.orders.delete(order_id).await?;
            Ok(false)
        }
    }

    /// Advance an order's delivery-progress status (admin only).
    ///
    /// The transition table is enforced: the new status must be a later
    /// stage than the current one.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` if the order id does not resolve.
    /// Returns `OrderError::Status` for a backward or same-stage move.
    pub async fn update_status(
        &self,
        order_id: OrderId,
        new_status: OrderStatus,
    ) -> Result<(), OrderError> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)?;

        let status = order.status.advance_to(new_status)?;
        self.orders.set_status(order_id, status).await?;

        self.events
            .publish(OrderEvent::OrderUpdated(OrderUpdatedPayload {
                order_id,
                status,
                payment: order.payment,
            }));

        Ok(())
    }

    /// Every order with purchaser name/email joined in (admin only).
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<AdminOrder>, OrderError> {
        Ok(self.orders.list_all().await?)
    }

    /// The calling user's orders.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_for_user(user_id).await?)
    }

    /// Shared creation path for both payment methods: resolve the address,
    /// then persist the order and its items in one transaction.
    async fn create_order(
        &self,
        user_id: UserId,
        items: Vec<OrderItem>,
        amount: Decimal,
        address: AddressSelector,
        payment_method: PaymentMethod,
    ) -> Result<(Order, String), OrderError> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(OrderError::UserNotFound)?;

        let snapshot = self.resolve_address(user_id, address).await?;

        let order = self
            .orders
            .insert(user_id, &items, &snapshot, amount, payment_method)
            .await?;

        Ok((order, user.name))
    }

    /// Resolve the order's shipping address.
    ///
    /// A given `addressId` must reference a saved address of that user; with
    /// no id, the inline fields are validated and persisted as exactly one
    /// new address-book entry.
    async fn resolve_address(
        &self,
        user_id: UserId,
        selector: AddressSelector,
    ) -> Result<AddressSnapshot, OrderError> {
        if let Some(address_id) = selector.address_id {
            let address = self
                .addresses
                .get(user_id, address_id)
                .await?
                .ok_or(OrderError::AddressNotFound)?;
            return Ok(address.snapshot());
        }

        let fields = selector.fields.into_validated()?;
        let address = self
            .addresses
            .insert(user_id, &fields)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => OrderError::UserNotFound,
                other => OrderError::Repository(other),
            })?;

        Ok(address.snapshot())
    }
}
