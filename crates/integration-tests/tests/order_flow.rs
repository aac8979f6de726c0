//! End-to-end tests for the register → cart → order flow.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p trellis-server)
//!
//! Run with: cargo test -p trellis-integration-tests -- --ignored

#![allow(clippy::expect_used)] // Integration tests can use expect for setup
#![allow(clippy::unwrap_used)] // Integration tests can use unwrap for assertions

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use trellis_integration_tests::base_url;

/// A unique email per test run, so reruns don't collide on the unique index.
fn unique_email(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{prefix}-{nanos}@integration.test")
}

/// Register a throwaway user and return their bearer token.
async fn register(client: &Client, email: &str) -> String {
    let resp = client
        .post(format!("{}/api/user/register", base_url()))
        .json(&json!({
            "name": "Alice",
            "email": email,
            "password": "password1",
        }))
        .send()
        .await
        .expect("register request failed");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("register response not json");
    assert_eq!(body["success"], true);
    body["token"].as_str().expect("no token in response").to_owned()
}

fn sample_address() -> Value {
    json!({
        "firstName": "Alice",
        "lastName": "Nguyen",
        "email": "a@x.com",
        "street": "1 Elm St",
        "city": "Springfield",
        "zipcode": "12345",
        "country": "US",
        "phone": "555-0100",
    })
}

fn sample_items() -> Value {
    json!([{
        "productId": "prod-1",
        "name": "Linen Shirt",
        "size": "M",
        "quantity": 2,
        "price": "19.99",
    }])
}

async fn fetch_cart(client: &Client, token: &str) -> Value {
    let resp = client
        .get(format!("{}/api/cart/get", base_url()))
        .bearer_auth(token)
        .send()
        .await
        .expect("cart get failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    body["cartData"].clone()
}

async fn fetch_addresses(client: &Client, token: &str) -> Vec<Value> {
    let resp = client
        .get(format!("{}/api/user/addresses", base_url()))
        .bearer_auth(token)
        .send()
        .await
        .expect("addresses get failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    body["addresses"].as_array().unwrap().clone()
}

async fn fetch_orders(client: &Client, token: &str) -> Vec<Value> {
    let resp = client
        .post(format!("{}/api/order/userorders", base_url()))
        .bearer_auth(token)
        .send()
        .await
        .expect("userorders failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    body["orders"].as_array().unwrap().clone()
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_cart_add_twice_then_zero_removes_entry() {
    let client = Client::new();
    let token = register(&client, &unique_email("cart")).await;

    for _ in 0..2 {
        let resp = client
            .post(format!("{}/api/cart/add", base_url()))
            .bearer_auth(&token)
            .json(&json!({ "itemId": "prod-1", "size": "M" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let cart = fetch_cart(&client, &token).await;
    assert_eq!(cart["prod-1"]["M"], 2);

    // Setting quantity to zero removes the entry and the empty product key.
    let resp = client
        .post(format!("{}/api/cart/update", base_url()))
        .bearer_auth(&token)
        .json(&json!({ "itemId": "prod-1", "size": "M", "quantity": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let cart = fetch_cart(&client, &token).await;
    assert_eq!(cart, json!({}));
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_cod_order_with_new_address() {
    let client = Client::new();
    let token = register(&client, &unique_email("cod")).await;

    // Seed the cart so clearing it is observable.
    let resp = client
        .post(format!("{}/api/cart/add", base_url()))
        .bearer_auth(&token)
        .json(&json!({ "itemId": "prod-1", "size": "M" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(fetch_addresses(&client, &token).await.len(), 0);

    let resp = client
        .post(format!("{}/api/order/place", base_url()))
        .bearer_auth(&token)
        .json(&json!({
            "items": sample_items(),
            "amount": "49.98",
            "address": sample_address(),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);

    // Placing with a new address appends exactly one address.
    let addresses = fetch_addresses(&client, &token).await;
    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses[0]["city"], "Springfield");

    // The cart snapshot is reset to the empty mapping.
    assert_eq!(fetch_cart(&client, &token).await, json!({}));

    // Exactly one order, defaulted and unpaid.
    let orders = fetch_orders(&client, &token).await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["status"], "Order Placed");
    assert_eq!(orders[0]["payment"], false);
    assert_eq!(orders[0]["paymentMethod"], "COD");
    assert_eq!(orders[0]["address"]["street"], "1 Elm St");
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_order_with_saved_address_adds_none() {
    let client = Client::new();
    let token = register(&client, &unique_email("saved")).await;

    // Save an address up front.
    let resp = client
        .post(format!("{}/api/user/addresses", base_url()))
        .bearer_auth(&token)
        .json(&sample_address())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let address_id = body["address"]["id"].clone();

    let resp = client
        .post(format!("{}/api/order/place", base_url()))
        .bearer_auth(&token)
        .json(&json!({
            "items": sample_items(),
            "amount": "49.98",
            "address": { "addressId": address_id },
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Placing with an existing addressId never adds an address.
    assert_eq!(fetch_addresses(&client, &token).await.len(), 1);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_order_with_incomplete_address_rejected() {
    let client = Client::new();
    let token = register(&client, &unique_email("badaddr")).await;

    let mut address = sample_address();
    address.as_object_mut().unwrap().remove("zipcode");

    let resp = client
        .post(format!("{}/api/order/place", base_url()))
        .bearer_auth(&token)
        .json(&json!({
            "items": sample_items(),
            "amount": "49.98",
            "address": address,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Nothing was persisted for the failed placement.
    assert_eq!(fetch_addresses(&client, &token).await.len(), 0);
    assert_eq!(fetch_orders(&client, &token).await.len(), 0);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_duplicate_registration_conflicts() {
    let client = Client::new();
    let email = unique_email("dup");
    let _token = register(&client, &email).await;

    let resp = client
        .post(format!("{}/api/user/register", base_url()))
        .json(&json!({
            "name": "Alice",
            "email": email,
            "password": "password1",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_profile_requires_token() {
    let client = Client::new();

    let resp = client
        .get(format!("{}/api/user/profile", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let token = register(&client, &unique_email("profile")).await;
    let resp = client
        .get(format!("{}/api/user/profile", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["user"]["name"], "Alice");
    assert!(body["user"].get("passwordHash").is_none());
}
