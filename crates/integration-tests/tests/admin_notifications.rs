//! End-to-end tests for admin order management and the notification channel.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p trellis-server) with
//!   `TRELLIS_ADMIN_EMAIL`/`TRELLIS_ADMIN_PASSWORD` matching this process's
//!   environment
//!
//! Run with: cargo test -p trellis-integration-tests -- --ignored

#![allow(clippy::expect_used)] // Integration tests can use expect for setup
#![allow(clippy::unwrap_used)] // Integration tests can use unwrap for assertions

use std::time::Duration;

use futures::StreamExt;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use trellis_integration_tests::{base_url, ws_url};

fn unique_email(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{prefix}-{nanos}@integration.test")
}

/// Login as the configured admin and return the bearer token.
async fn admin_token(client: &Client) -> String {
    let email = std::env::var("TRELLIS_ADMIN_EMAIL")
        .expect("TRELLIS_ADMIN_EMAIL must be set for admin tests");
    let password = std::env::var("TRELLIS_ADMIN_PASSWORD")
        .expect("TRELLIS_ADMIN_PASSWORD must be set for admin tests");

    let resp = client
        .post(format!("{}/api/user/admin/login", base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("admin login failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    body["token"].as_str().expect("no admin token").to_owned()
}

/// Register a user, place a COD order, and return (user token, order id).
async fn place_order(client: &Client) -> (String, Value) {
    let resp = client
        .post(format!("{}/api/user/register", base_url()))
        .json(&json!({
            "name": "Alice",
            "email": unique_email("admin-flow"),
            "password": "password1",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_owned();

    let resp = client
        .post(format!("{}/api/order/place", base_url()))
        .bearer_auth(&token)
        .json(&json!({
            "items": [{
                "productId": "prod-1",
                "name": "Linen Shirt",
                "size": "M",
                "quantity": 1,
                "price": "19.99",
            }],
            "amount": "29.99",
            "address": {
                "firstName": "Alice",
                "lastName": "Nguyen",
                "email": "a@x.com",
                "street": "1 Elm St",
                "city": "Springfield",
                "zipcode": "12345",
                "country": "US",
                "phone": "555-0100",
            },
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(format!("{}/api/order/userorders", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let order_id = body["orders"][0]["id"].clone();
    assert!(order_id.is_number());

    (token, order_id)
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_socket_rejects_missing_and_non_admin_tokens() {
    let client = Client::new();

    // No token at all.
    assert!(connect_async(ws_url()).await.is_err());

    // A valid user token is not enough.
    let (user_token, _) = place_order(&client).await;
    let result = connect_async(format!("{}?token={user_token}", ws_url())).await;
    assert!(result.is_err());

    // Garbage is rejected too.
    let result = connect_async(format!("{}?token=not-a-token", ws_url())).await;
    assert!(result.is_err());
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_admin_endpoints_reject_user_tokens() {
    let client = Client::new();
    let (user_token, order_id) = place_order(&client).await;

    let resp = client
        .get(format!("{}/api/order/all", base_url()))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .put(format!("{}/api/order/update", base_url()))
        .bearer_auth(&user_token)
        .json(&json!({ "orderId": order_id, "status": "Shipped" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_status_update_reaches_admin_socket() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (_user_token, order_id) = place_order(&client).await;

    // Subscribe before mutating; there is no replay.
    let (ws_stream, _) = connect_async(format!("{}?token={admin}", ws_url()))
        .await
        .expect("admin socket rejected");
    let (_write, mut read) = ws_stream.split();

    let resp = client
        .put(format!("{}/api/order/update", base_url()))
        .bearer_auth(&admin)
        .json(&json!({ "orderId": order_id, "status": "Shipped" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // One orderUpdated event with the persisted status.
    let event = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match read.next().await.expect("socket closed early") {
                Ok(Message::Text(text)) => {
                    let event: Value = serde_json::from_str(&text).unwrap();
                    if event["event"] == "orderUpdated" && event["data"]["orderId"] == order_id {
                        break event;
                    }
                }
                Ok(_) => {}
                Err(e) => panic!("socket error: {e}"),
            }
        }
    })
    .await
    .expect("no orderUpdated event within 5s");

    assert_eq!(event["data"]["status"], "Shipped");
    assert_eq!(event["data"]["payment"], false);

    // listAll reflects the same persisted status.
    let resp = client
        .get(format!("{}/api/order/all", base_url()))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let order = body["orders"]
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["id"] == order_id)
        .expect("order missing from listAll");
    assert_eq!(order["status"], "Shipped");
    assert!(order["userName"].is_string());
    assert!(order["userEmail"].is_string());
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_backward_status_move_rejected() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (_user_token, order_id) = place_order(&client).await;

    let resp = client
        .put(format!("{}/api/order/update", base_url()))
        .bearer_auth(&admin)
        .json(&json!({ "orderId": order_id, "status": "Shipped" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Moving back to Packing is not a forward transition.
    let resp = client
        .put(format!("{}/api/order/update", base_url()))
        .bearer_auth(&admin)
        .json(&json!({ "orderId": order_id, "status": "Packing" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Unknown labels are rejected outright.
    let resp = client
        .put(format!("{}/api/order/update", base_url()))
        .bearer_auth(&admin)
        .json(&json!({ "orderId": order_id, "status": "Teleported" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
