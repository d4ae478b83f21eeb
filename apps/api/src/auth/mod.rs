//! Account registration, login and bearer-token verification.
//!
//! Tokens are HS256 JWTs signed with the configured secret. `AuthUser` is the extractor
//! handlers use to require a valid token; it yields the user id and nothing else.

pub mod handlers;
pub mod users;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization token required")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Token signing failed: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a decimal string.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signing and verification keys derived from the configured secret.
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl AuthKeys {
    pub fn new(secret: &[u8], ttl_hours: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 30;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, user_id: i64) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(AuthError::Encode)
    }

    /// Returns the user id carried by a valid, unexpired token.
    pub fn verify(&self, token: &str) -> Result<i64, AuthError> {
        let data =
            decode::<Claims>(token, &self.decoding, &self.validation).map_err(AuthError::InvalidToken)?;
        data.claims.sub.parse().map_err(|_| {
            AuthError::InvalidToken(jsonwebtoken::errors::ErrorKind::InvalidSubject.into())
        })
    }
}

/// The id of the caller, taken from a verified `Authorization: Bearer` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub i64);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let user_id = state.auth.verify(token)?;
        debug!("Authenticated user {user_id}");
        Ok(AuthUser(user_id))
    }
}
