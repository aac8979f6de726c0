//! Order event publishing.
//!
//! `OrderEvents` is the explicit publisher handle injected into the order
//! service, decoupling it from the WebSocket transport. Publishing is
//! fire-and-forget over a `tokio::sync::broadcast` channel: it never blocks,
//! a send with no subscribers is not an error, and delivery is at-most-once —
//! a subscriber that lags or disconnects permanently misses those events and
//! must refetch the full order list to resynchronize.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::broadcast;

use trellis_core::{OrderId, OrderStatus, PaymentMethod};

use crate::models::{AddressSnapshot, Order, OrderItem};

/// Buffered events per subscriber before a slow one starts lagging.
const CHANNEL_CAPACITY: usize = 256;

/// An order lifecycle event, serialized as `{"event": ..., "data": ...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum OrderEvent {
    /// A new order was created (COD or card, payment possibly still pending).
    NewOrder(NewOrderPayload),
    /// An order's status or payment flag changed.
    OrderUpdated(OrderUpdatedPayload),
}

/// Full order snapshot, emitted once per created order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderPayload {
    pub order_id: OrderId,
    pub user_name: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub date: DateTime<Utc>,
    pub items: Vec<OrderItem>,
    pub address: AddressSnapshot,
}

impl NewOrderPayload {
    /// Build the payload from a persisted order and its purchaser's name.
    #[must_use]
    pub fn from_order(order: &Order, user_name: String) -> Self {
        Self {
            order_id: order.id,
            user_name,
            amount: order.amount,
            payment_method: order.payment_method,
            status: order.status,
            date: order.date,
            items: order.items.clone(),
            address: order.address.clone(),
        }
    }
}

/// Status/payment delta, emitted on every status change or payment verification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdatedPayload {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub payment: bool,
}

/// Cloneable publisher handle for order events.
#[derive(Clone)]
pub struct OrderEvents {
    tx: broadcast::Sender<OrderEvent>,
}

impl OrderEvents {
    /// Create a new publisher with the default buffer capacity.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Never blocks and never fails: with no subscribers the event is simply
    /// dropped.
    pub fn publish(&self, event: OrderEvent) {
        match self.tx.send(event) {
            Ok(subscribers) => {
                tracing::debug!(subscribers, "order event published");
            }
            Err(_) => {
                tracing::debug!("order event dropped (no subscribers)");
            }
        }
    }

    /// Subscribe to subsequent events. Events published before the call are
    /// not replayed.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.tx.subscribe()
    }
}

impl Default for OrderEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_payload() -> OrderUpdatedPayload {
        OrderUpdatedPayload {
            order_id: OrderId::new(1),
            status: OrderStatus::Shipped,
            payment: true,
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let events = OrderEvents::new();
        let mut rx = events.subscribe();

        events.publish(OrderEvent::OrderUpdated(sample_payload()));

        let event = rx.recv().await.unwrap();
        match event {
            OrderEvent::OrderUpdated(payload) => {
                assert_eq!(payload.order_id, OrderId::new(1));
                assert_eq!(payload.status, OrderStatus::Shipped);
                assert!(payload.payment);
            }
            OrderEvent::NewOrder(_) => panic!("wrong event kind"),
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_not_an_error() {
        let events = OrderEvents::new();
        events.publish(OrderEvent::OrderUpdated(sample_payload()));
    }

    #[test]
    fn test_no_replay_for_late_subscribers() {
        let events = OrderEvents::new();
        events.publish(OrderEvent::OrderUpdated(sample_payload()));

        let mut rx = events.subscribe();
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn test_event_wire_shape() {
        let event = OrderEvent::OrderUpdated(sample_payload());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "orderUpdated");
        assert_eq!(json["data"]["orderId"], 1);
        assert_eq!(json["data"]["status"], "Shipped");
        assert_eq!(json["data"]["payment"], true);
    }
}
