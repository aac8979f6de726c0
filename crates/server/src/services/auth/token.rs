//! Bearer-token issuing and verification.
//!
//! Tokens are HS256 JWTs carrying the principal and role. User tokens live
//! seven days; admin tokens one hour, matching the shorter admin session the
//! storefront has always had.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use trellis_core::{UserId, UserRole};

use super::AuthError;

/// User token lifetime.
const USER_TOKEN_TTL_DAYS: i64 = 7;
/// Admin token lifetime.
const ADMIN_TOKEN_TTL_HOURS: i64 = 1;

/// Claims carried by every bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Principal: the user id, or the admin email for configured admins.
    pub sub: String,
    /// Principal role.
    pub role: UserRole,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

impl Claims {
    /// The user id this token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for admin tokens issued from the
    /// configured credentials (their subject is an email, not a user id).
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub.parse::<UserId>().map_err(|_| AuthError::InvalidToken)
    }
}

/// Signs and verifies bearer tokens with a shared HS256 secret.
#[derive(Clone)]
pub struct TokenSigner {
    header: Header,
    validation: Validation,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenSigner {
    /// Create a signer from the configured secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            header: Header::default(),
            validation: Validation::default(),
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
        }
    }

    /// Issue a token for a regular user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if signing fails.
    pub fn issue_user(&self, user_id: UserId) -> Result<String, AuthError> {
        self.issue(
            user_id.to_string(),
            UserRole::User,
            Duration::days(USER_TOKEN_TTL_DAYS),
        )
    }

    /// Issue a token for the configured admin principal.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if signing fails.
    pub fn issue_admin(&self, email: &str) -> Result<String, AuthError> {
        self.issue(
            email.to_owned(),
            UserRole::Admin,
            Duration::hours(ADMIN_TOKEN_TTL_HOURS),
        )
    }

    fn issue(&self, sub: String, role: UserRole, ttl: Duration) -> Result<String, AuthError> {
        let claims = Claims {
            sub,
            role,
            exp: (Utc::now() + ttl).timestamp(),
        };

        jsonwebtoken::encode(&self.header, &claims, &self.encoding_key)
            .map_err(AuthError::Token)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is malformed, expired,
    /// or signed with a different secret.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}
