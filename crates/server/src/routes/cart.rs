//! Cart route handlers.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::services::CartService;
use crate::state::AppState;

/// `POST /api/cart/add` request body.
///
/// Fields are optional so a missing one maps to a 400, not a decode failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartAddRequest {
    pub item_id: Option<String>,
    pub size: Option<String>,
}

/// `POST /api/cart/update` request body.
///
/// `quantity` is signed on the wire: zero and negative both mean "remove the
/// entry".
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartUpdateRequest {
    pub item_id: Option<String>,
    pub size: Option<String>,
    pub quantity: Option<i64>,
}

/// `POST /api/cart/add`
pub async fn add(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CartAddRequest>,
) -> Result<impl IntoResponse> {
    let (item_id, size) = match (body.item_id, body.size) {
        (Some(item_id), Some(size)) => (item_id, size),
        _ => {
            return Err(AppError::BadRequest(
                "missing required fields: itemId or size".to_owned(),
            ));
        }
    };

    CartService::new(state.pool()).add(user_id, &item_id, &size).await?;

    Ok(Json(json!({ "success": true, "message": "added to cart" })))
}

/// `POST /api/cart/update`
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CartUpdateRequest>,
) -> Result<impl IntoResponse> {
    let (item_id, size, quantity) = match (body.item_id, body.size, body.quantity) {
        (Some(item_id), Some(size), Some(quantity)) => (item_id, size, quantity),
        _ => {
            return Err(AppError::BadRequest(
                "missing required fields: itemId, size, or quantity".to_owned(),
            ));
        }
    };

    // Negative quantities behave like zero: the entry is removed.
    let quantity = u32::try_from(quantity.max(0)).unwrap_or(u32::MAX);

    CartService::new(state.pool())
        .set(user_id, &item_id, &size, quantity)
        .await?;

    Ok(Json(json!({ "success": true, "message": "cart updated" })))
}

/// `GET /api/cart/get`
pub async fn get(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse> {
    let cart = CartService::new(state.pool()).get(user_id).await?;

    Ok(Json(json!({ "success": true, "cartData": cart })))
}
