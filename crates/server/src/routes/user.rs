//! User authentication route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::services::AuthService;
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request body, shared by user and admin login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /api/user/register`
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool(), state.signer(), &state.config().admin);
    let (user, token) = auth.register(&body.name, &body.email, &body.password).await?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "token": token })),
    ))
}

/// `POST /api/user/login`
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool(), state.signer(), &state.config().admin);
    let (_user, token) = auth.login(&body.email, &body.password).await?;

    Ok(Json(json!({ "success": true, "token": token })))
}

/// `POST /api/user/admin/login`
pub async fn admin_login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool(), state.signer(), &state.config().admin);
    let token = auth.admin_login(&body.email, &body.password)?;

    tracing::info!("admin logged in");

    Ok(Json(json!({ "success": true, "token": token })))
}

/// `GET /api/user/profile`
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool(), state.signer(), &state.config().admin);
    let user = auth.profile(user_id).await?;

    Ok(Json(json!({ "success": true, "user": user })))
}
