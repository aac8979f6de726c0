//! Address book route handlers.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

use trellis_core::AddressId;

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::models::AddressPatch;
use crate::services::AddressBookService;
use crate::state::AppState;

/// `GET /api/user/addresses`
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse> {
    let addresses = AddressBookService::new(state.pool()).list(user_id).await?;

    Ok(Json(json!({ "success": true, "addresses": addresses })))
}

/// `POST /api/user/addresses`
pub async fn add(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<AddressPatch>,
) -> Result<impl IntoResponse> {
    let address = AddressBookService::new(state.pool()).add(user_id, body).await?;

    Ok(Json(json!({
        "success": true,
        "message": "address added",
        "address": address,
    })))
}

/// `PUT /api/user/addresses/{address_id}`
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(address_id): Path<AddressId>,
    Json(body): Json<AddressPatch>,
) -> Result<impl IntoResponse> {
    let address = AddressBookService::new(state.pool())
        .update(user_id, address_id, body)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "address updated",
        "address": address,
    })))
}

/// `DELETE /api/user/addresses/{address_id}`
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(address_id): Path<AddressId>,
) -> Result<impl IntoResponse> {
    AddressBookService::new(state.pool())
        .delete(user_id, address_id)
        .await?;

    Ok(Json(json!({ "success": true, "message": "address deleted" })))
}
