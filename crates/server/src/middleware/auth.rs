//! Authentication extractors.
//!
//! Bearer tokens arrive in the `Authorization` header; the extractors verify
//! them against the shared signer and hand the handler a typed principal.
//! Rejections are `AppError`s, so failures use the same JSON envelope and
//! status mapping as everything else.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use trellis_core::UserId;

use crate::error::AppError;
use crate::services::auth::Claims;
use crate::state::AppState;

/// Extractor that requires a valid user token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     AuthUser(user_id): AuthUser,
/// ) -> impl IntoResponse {
///     format!("Hello, user {user_id}!")
/// }
/// ```
pub struct AuthUser(pub UserId);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = verify_bearer(parts, state)?;
        let user_id = claims
            .user_id()
            .map_err(|_| AppError::Unauthorized("not authorized, login again".to_owned()))?;

        Ok(Self(user_id))
    }
}

/// Extractor that requires a valid admin token.
pub struct AuthAdmin(pub Claims);

impl FromRequestParts<AppState> for AuthAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = verify_bearer(parts, state)?;
        if !claims.role.is_admin() {
            return Err(AppError::Unauthorized(
                "not authorized as admin".to_owned(),
            ));
        }

        Ok(Self(claims))
    }
}

/// Pull the bearer token out of the `Authorization` header and verify it.
fn verify_bearer(parts: &Parts, state: &AppState) -> Result<Claims, AppError> {
    let header_value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("not authorized, login again".to_owned()))?;

    let token = header_value
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("not authorized, login again".to_owned()))?;

    state.signer().verify(token).map_err(Into::into)
}
