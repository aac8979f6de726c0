//! Order lifecycle enums.
//!
//! The delivery-progress status is distinct from payment state: payment is a
//! boolean flag on the order, while [`OrderStatus`] is the admin-controlled
//! fulfillment label. Status moves forward only; the transition table is
//! enforced here rather than trusting clients to send sane values.

use serde::{Deserialize, Serialize};

/// Error advancing an order's status.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderStatusError {
    /// The string did not name a known status.
    #[error("unknown order status: {0}")]
    Unknown(String),
    /// The requested transition does not move the order forward.
    #[error("cannot move order from '{from}' to '{to}'")]
    NotForward {
        /// Current status.
        from: OrderStatus,
        /// Rejected target status.
        to: OrderStatus,
    },
}

/// Admin-controlled delivery-progress label.
///
/// Serialized with the customer-facing wording (`"Order Placed"`,
/// `"Out for delivery"`, ...) so stored rows and wire payloads match what
/// the storefront displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Initial status of every order.
    #[default]
    #[serde(rename = "Order Placed")]
    OrderPlaced,
    #[serde(rename = "Packing")]
    Packing,
    #[serde(rename = "Shipped")]
    Shipped,
    #[serde(rename = "Out for delivery")]
    OutForDelivery,
    /// Terminal status.
    #[serde(rename = "Delivered")]
    Delivered,
}

impl OrderStatus {
    /// All statuses in delivery order.
    pub const ALL: [Self; 5] = [
        Self::OrderPlaced,
        Self::Packing,
        Self::Shipped,
        Self::OutForDelivery,
        Self::Delivered,
    ];

    /// Position of this status in the delivery progression.
    #[must_use]
    pub const fn stage(self) -> u8 {
        match self {
            Self::OrderPlaced => 0,
            Self::Packing => 1,
            Self::Shipped => 2,
            Self::OutForDelivery => 3,
            Self::Delivered => 4,
        }
    }

    /// Check that moving to `next` is a forward transition.
    ///
    /// # Errors
    ///
    /// Returns [`OrderStatusError::NotForward`] if `next` is the current
    /// status or an earlier stage.
    pub fn advance_to(self, next: Self) -> Result<Self, OrderStatusError> {
        if next.stage() > self.stage() {
            Ok(next)
        } else {
            Err(OrderStatusError::NotForward {
                from: self,
                to: next,
            })
        }
    }

    /// Customer-facing label, identical to the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrderPlaced => "Order Placed",
            Self::Packing => "Packing",
            Self::Shipped => "Shipped",
            Self::OutForDelivery => "Out for delivery",
            Self::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = OrderStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| OrderStatusError::Unknown(s.to_owned()))
    }
}

/// How an order is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[serde(rename = "COD")]
    Cod,
    /// Hosted Stripe Checkout session.
    Stripe,
}

impl PaymentMethod {
    /// Wire/storage label, identical to the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cod => "COD",
            Self::Stripe => "Stripe",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COD" => Ok(Self::Cod),
            "Stripe" => Ok(Self::Stripe),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels_roundtrip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!(matches!(
            "Teleported".parse::<OrderStatus>(),
            Err(OrderStatusError::Unknown(_))
        ));
    }

    #[test]
    fn test_forward_transitions_allowed() {
        assert_eq!(
            OrderStatus::OrderPlaced.advance_to(OrderStatus::Packing),
            Ok(OrderStatus::Packing)
        );
        // Skipping stages forward is allowed; only direction is enforced.
        assert_eq!(
            OrderStatus::OrderPlaced.advance_to(OrderStatus::Delivered),
            Ok(OrderStatus::Delivered)
        );
    }

    #[test]
    fn test_backward_and_same_transitions_rejected() {
        assert!(matches!(
            OrderStatus::Shipped.advance_to(OrderStatus::Packing),
            Err(OrderStatusError::NotForward { .. })
        ));
        assert!(matches!(
            OrderStatus::Shipped.advance_to(OrderStatus::Shipped),
            Err(OrderStatusError::NotForward { .. })
        ));
    }

    #[test]
    fn test_status_serde_uses_display_labels() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"Out for delivery\"");
        let back: OrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, OrderStatus::OutForDelivery);
    }

    #[test]
    fn test_payment_method_labels() {
        assert_eq!(PaymentMethod::Cod.as_str(), "COD");
        assert_eq!("Stripe".parse::<PaymentMethod>().unwrap(), PaymentMethod::Stripe);
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Cod).unwrap(),
            "\"COD\""
        );
    }
}
