//! Order route handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::header,
    http::HeaderMap,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use trellis_core::{OrderId, OrderStatus};

use crate::error::{AppError, Result};
use crate::middleware::{AuthAdmin, AuthUser};
use crate::models::OrderItem;
use crate::services::{AddressSelector, OrderService};
use crate::state::AppState;

/// Order placement request body, shared by the COD and Stripe paths.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderItem>,
    pub amount: Decimal,
    pub address: AddressSelector,
}

/// `GET /api/order/verify` query parameters.
///
/// Optional on the wire so a missing parameter maps to a 400.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyQuery {
    pub order_id: Option<String>,
    pub success: Option<String>,
}

/// `PUT /api/order/update` request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub order_id: Option<OrderId>,
    pub status: Option<String>,
}

/// `POST /api/order/place`
pub async fn place(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse> {
    let orders = OrderService::new(state.pool(), state.stripe(), state.events());
    orders
        .place(user_id, body.items, body.amount, body.address)
        .await?;

    Ok(Json(json!({ "success": true, "message": "order placed successfully" })))
}

/// `POST /api/order/stripe`
pub async fn place_stripe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    headers: HeaderMap,
    Json(body): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse> {
    // Callback URLs point back at the frontend that initiated checkout;
    // fall back to the configured public URL for non-browser clients.
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(&state.config().public_url)
        .to_owned();

    let orders = OrderService::new(state.pool(), state.stripe(), state.events());
    let session_url = orders
        .place_with_stripe(user_id, body.items, body.amount, body.address, &origin)
        .await?;

    Ok(Json(json!({ "success": true, "session_url": session_url })))
}

/// `GET /api/order/verify?orderId&success`
pub async fn verify(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(query): Query<VerifyQuery>,
) -> Result<impl IntoResponse> {
    let (Some(order_id), Some(success)) = (query.order_id, query.success) else {
        return Err(AppError::BadRequest(
            "missing required query parameters: orderId or success".to_owned(),
        ));
    };

    let order_id = order_id
        .parse::<OrderId>()
        .map_err(|_| AppError::BadRequest("invalid orderId".to_owned()))?;

    let orders = OrderService::new(state.pool(), state.stripe(), state.events());
    let paid = orders.verify_payment(order_id, success == "true").await?;

    if paid {
        Ok(Json(json!({
            "success": true,
            "message": "payment verified and order placed successfully",
        })))
    } else {
        Ok(Json(json!({
            "success": false,
            "message": "payment failed or was cancelled",
        })))
    }
}

/// `POST /api/order/userorders`
pub async fn user_orders(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse> {
    let orders = OrderService::new(state.pool(), state.stripe(), state.events());
    let list = orders.list_for_user(user_id).await?;

    Ok(Json(json!({ "success": true, "orders": list })))
}

/// `GET /api/order/all` (admin)
pub async fn all(
    State(state): State<AppState>,
    AuthAdmin(_claims): AuthAdmin,
) -> Result<impl IntoResponse> {
    let orders = OrderService::new(state.pool(), state.stripe(), state.events());
    let list = orders.list_all().await?;

    Ok(Json(json!({ "success": true, "orders": list })))
}

/// `PUT /api/order/update` (admin)
pub async fn update_status(
    State(state): State<AppState>,
    AuthAdmin(_claims): AuthAdmin,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse> {
    let (Some(order_id), Some(status)) = (body.order_id, body.status) else {
        return Err(AppError::BadRequest(
            "missing required fields: orderId or status".to_owned(),
        ));
    };

    let status = status
        .parse::<OrderStatus>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let orders = OrderService::new(state.pool(), state.stripe(), state.events());
    orders.update_status(order_id, status).await?;

    Ok(Json(json!({ "success": true, "message": "order status updated" })))
}
