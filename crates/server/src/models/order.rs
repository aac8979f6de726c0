//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use trellis_core::{OrderId, OrderStatus, PaymentMethod, UserId};

use super::address::AddressSnapshot;

/// A line item on an order.
///
/// Product name and unit price are copied at order time; later catalog edits
/// must not retroactively change a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Opaque reference into the (external) product catalog.
    pub product_id: String,
    /// Product name at order time.
    pub name: String,
    /// Chosen size label.
    pub size: String,
    /// Quantity ordered.
    pub quantity: u32,
    /// Unit price at order time.
    pub price: Decimal,
}

/// A placed order (domain type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Purchaser.
    pub user_id: UserId,
    /// Line items, copied at order time.
    pub items: Vec<OrderItem>,
    /// Denormalized shipping address snapshot.
    pub address: AddressSnapshot,
    /// Total amount charged.
    pub amount: Decimal,
    /// How the order is paid.
    pub payment_method: PaymentMethod,
    /// Whether payment has completed.
    pub payment: bool,
    /// Admin-controlled delivery-progress status.
    pub status: OrderStatus,
    /// When the order was placed.
    pub date: DateTime<Utc>,
}

/// An order joined with its purchaser, for the admin listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrder {
    #[serde(flatten)]
    pub order: Order,
    /// Purchaser display name.
    pub user_name: String,
    /// Purchaser email.
    pub user_email: String,
}
