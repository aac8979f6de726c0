//! Stripe Checkout client.
//!
//! Creates hosted Checkout Sessions over Stripe's form-encoded REST API:
//! one line item per order item (unit price in minor units) plus a flat
//! delivery-charge line. No retries — a failed session creation surfaces
//! immediately to the caller.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use trellis_core::OrderId;

use crate::config::StripeConfig;
use crate::models::OrderItem;

/// Stripe API base URL.
const BASE_URL: &str = "https://api.stripe.com/v1";

/// Name of the synthetic delivery-charge line item.
const DELIVERY_LINE_NAME: &str = "Delivery Charges";

/// Errors that can occur when interacting with the Stripe API.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An item price does not fit in minor units.
    #[error("unrepresentable amount: {0}")]
    BadAmount(Decimal),
}

/// A created Checkout Session.
#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    /// Session id (`cs_...`).
    pub id: String,
    /// Hosted payment page URL the client is redirected to.
    pub url: Option<String>,
}

/// Stripe Checkout API client.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    secret_key: SecretString,
    currency: String,
    delivery_fee: Decimal,
}

impl StripeClient {
    /// Create a new Stripe API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StripeConfig) -> Result<Self, StripeError> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            secret_key: config.secret_key.clone(),
            currency: config.currency.clone(),
            delivery_fee: config.delivery_fee,
        })
    }

    /// Create a hosted Checkout Session for an order.
    ///
    /// The success/cancel URLs point back at the verification endpoint with
    /// the order id embedded, so the storefront can settle the order after
    /// the customer returns from Stripe.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the session has no
    /// redirect URL.
    pub async fn create_checkout_session(
        &self,
        order_id: OrderId,
        items: &[OrderItem],
        origin: &str,
    ) -> Result<String, StripeError> {
        let params = checkout_params(
            order_id,
            items,
            &self.currency,
            self.delivery_fee,
            origin,
        )?;

        let response = self
            .client
            .post(format!("{BASE_URL}/checkout/sessions"))
            .basic_auth(self.secret_key.expose_secret(), None::<&str>)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: CheckoutSession = response
            .json()
            .await
            .map_err(|e| StripeError::Parse(e.to_string()))?;

        session.url.ok_or_else(|| {
            StripeError::Parse(format!("session {} has no redirect url", session.id))
        })
    }
}

/// Build the form parameters for a Checkout Session.
///
/// Stripe's form encoding addresses nested structures with bracketed keys
/// (`line_items[0][price_data][unit_amount]`). Prices are converted to minor
/// units (× 100).
fn checkout_params(
    order_id: OrderId,
    items: &[OrderItem],
    currency: &str,
    delivery_fee: Decimal,
    origin: &str,
) -> Result<Vec<(String, String)>, StripeError> {
    let mut params = vec![
        ("mode".to_owned(), "payment".to_owned()),
        (
            "success_url".to_owned(),
            format!("{origin}/verify?success=true&orderId={order_id}"),
        ),
        (
            "cancel_url".to_owned(),
            format!("{origin}/verify?success=false&orderId={order_id}"),
        ),
    ];

    for (index, item) in items.iter().enumerate() {
        params.push((
            format!("line_items[{index}][price_data][currency]"),
            currency.to_owned(),
        ));
        params.push((
            format!("line_items[{index}][price_data][product_data][name]"),
            item.name.clone(),
        ));
        params.push((
            format!("line_items[{index}][price_data][unit_amount]"),
            minor_units(item.price)?.to_string(),
        ));
        params.push((
            format!("line_items[{index}][quantity]"),
            item.quantity.to_string(),
        ));
    }

    let delivery_index = items.len();
    params.push((
        format!("line_items[{delivery_index}][price_data][currency]"),
        currency.to_owned(),
    ));
    params.push((
        format!("line_items[{delivery_index}][price_data][product_data][name]"),
        DELIVERY_LINE_NAME.to_owned(),
    ));
    params.push((
        format!("line_items[{delivery_index}][price_data][unit_amount]"),
        minor_units(delivery_fee)?.to_string(),
    ));
    params.push((format!("line_items[{delivery_index}][quantity]"), "1".to_owned()));

    Ok(params)
}

/// Convert a price to minor units (× 100), truncating sub-cent remainders.
fn minor_units(price: Decimal) -> Result<i64, StripeError> {
    (price * Decimal::ONE_HUNDRED)
        .trunc()
        .to_i64()
        .ok_or(StripeError::BadAmount(price))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn items() -> Vec<OrderItem> {
        vec![
            OrderItem {
                product_id: "prod-1".into(),
                name: "Linen Shirt".into(),
                size: "M".into(),
                quantity: 2,
                price: Decimal::new(1999, 2), // 19.99
            },
            OrderItem {
                product_id: "prod-2".into(),
                name: "Canvas Tote".into(),
                size: "One Size".into(),
                quantity: 1,
                price: Decimal::new(35, 0),
            },
        ]
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(minor_units(Decimal::new(1999, 2)).unwrap(), 1999);
        assert_eq!(minor_units(Decimal::new(35, 0)).unwrap(), 3500);
        assert_eq!(minor_units(Decimal::ZERO).unwrap(), 0);
    }

    #[test]
    fn test_checkout_params_one_line_per_item_plus_delivery() {
        let params = checkout_params(
            OrderId::new(7),
            &items(),
            "usd",
            Decimal::new(10, 0),
            "http://localhost:3000",
        )
        .unwrap();

        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
                .unwrap()
        };

        assert_eq!(get("mode"), "payment");
        assert_eq!(
            get("success_url"),
            "http://localhost:3000/verify?success=true&orderId=7"
        );
        assert_eq!(
            get("cancel_url"),
            "http://localhost:3000/verify?success=false&orderId=7"
        );

        // Item lines at unit price × 100 minor units.
        assert_eq!(get("line_items[0][price_data][unit_amount]"), "1999");
        assert_eq!(get("line_items[0][quantity]"), "2");
        assert_eq!(get("line_items[1][price_data][unit_amount]"), "3500");

        // One fixed delivery-charge line after the items.
        assert_eq!(
            get("line_items[2][price_data][product_data][name]"),
            DELIVERY_LINE_NAME
        );
        assert_eq!(get("line_items[2][price_data][unit_amount]"), "1000");
        assert_eq!(get("line_items[2][quantity]"), "1");

        // Exactly three lines: no stray indices.
        assert!(!params.iter().any(|(k, _)| k.starts_with("line_items[3]")));
    }
}
