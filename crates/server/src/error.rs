//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding. All route handlers return `Result<T, AppError>`;
//! every error response is the JSON envelope `{"success": false, "message"}`
//! with the status code derived from the error kind.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AddressError, AuthError, CartError, OrderError, StripeError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed request fields.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing/invalid/expired token, wrong credentials, or wrong role.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Missing user/address/order.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate registration email and friends.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Payment processor call failed.
    #[error("Stripe error: {0}")]
    Stripe(StripeError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side errors to Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_) | Self::Stripe(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Stripe(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Stripe(_) => "Payment service error".to_string(),
            Self::BadRequest(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg) => msg.clone(),
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("not found".to_owned()),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Database(other),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidEmail(e) => Self::BadRequest(format!("please enter a valid email: {e}")),
            AuthError::WeakPassword(msg) => Self::BadRequest(msg),
            AuthError::UserAlreadyExists => Self::Conflict("user already exists".to_owned()),
            AuthError::UserNotFound => Self::NotFound("user doesn't exist".to_owned()),
            AuthError::InvalidCredentials => Self::Unauthorized("invalid credentials".to_owned()),
            AuthError::InvalidToken => Self::Unauthorized("invalid token, login again".to_owned()),
            AuthError::Repository(e) => e.into(),
            AuthError::Token(e) => Self::Internal(format!("token signing failed: {e}")),
            AuthError::PasswordHash => Self::Internal("password hashing failed".to_owned()),
        }
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::UserNotFound => Self::NotFound("user not found".to_owned()),
            CartError::EntryNotFound => {
                Self::BadRequest("item or size not found in cart".to_owned())
            }
            CartError::Repository(e) => e.into(),
        }
    }
}

impl From<AddressError> for AppError {
    fn from(err: AddressError) -> Self {
        match err {
            AddressError::UserNotFound => Self::NotFound("user not found".to_owned()),
            AddressError::NotFound => Self::NotFound("address not found".to_owned()),
            AddressError::MissingField(e) => Self::BadRequest(e.to_string()),
            AddressError::Repository(e) => e.into(),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::UserNotFound => Self::NotFound("user not found".to_owned()),
            OrderError::AddressNotFound => Self::NotFound("address not found".to_owned()),
            OrderError::OrderNotFound => Self::NotFound("order not found".to_owned()),
            OrderError::MissingField(e) => Self::BadRequest(e.to_string()),
            OrderError::Status(e) => Self::BadRequest(e.to_string()),
            OrderError::Stripe(e) => Self::Stripe(e),
            OrderError::Repository(e) => e.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use trellis_core::OrderStatusError;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes_follow_error_kind() {
        assert_eq!(
            get_status(AppError::BadRequest("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Unauthorized("x".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("x".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::NotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Conflict("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_mapping() {
        assert_eq!(
            get_status(AuthError::UserAlreadyExists.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AuthError::UserNotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AuthError::InvalidToken.into()),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_cart_error_mapping() {
        assert_eq!(
            get_status(CartError::UserNotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(CartError::EntryNotFound.into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_order_status_error_is_bad_request() {
        let err = OrderError::Status(OrderStatusError::Unknown("Teleported".into()));
        assert_eq!(get_status(err.into()), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_repository_not_found_maps_to_404() {
        assert_eq!(
            get_status(RepositoryError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
    }
}
