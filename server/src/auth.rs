//! Authentication for the Gatherly server.
//!
//! Three concerns live here:
//!
//! 1. **Token service**: [`issue_token`] produces a signed JWT embedding the
//!    user id with a one-hour expiry; [`verify_token`] validates signature
//!    and expiry and returns the user id.
//! 2. **Password hashing**: [`hash_password`] / [`verify_password`] wrap
//!    Argon2 with a random per-user salt.
//! 3. **Auth gate**: [`require_auth`] is axum middleware layered over the
//!    protected routes. It extracts the bearer token from the
//!    `Authorization` header, verifies it, and attaches the resolved
//!    [`AuthUser`] to the request extensions for downstream handlers. Any
//!    failure halts the pipeline with a 401 JSON error.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::ApiError;
use crate::routes::AppState;

/// Token lifetime in seconds (one hour).
const TOKEN_TTL_SECS: i64 = 3600;

/// Scheme prefix expected in the `Authorization` header.
const BEARER_PREFIX: &str = "Bearer ";

/// Errors produced by the token service and auth gate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization: Bearer <token>` header was present.
    #[error("missing bearer token")]
    MissingToken,

    /// The token signature did not validate or the token is malformed.
    #[error("invalid token")]
    InvalidToken,

    /// The token was valid once but its expiry has passed.
    #[error("token expired")]
    ExpiredToken,

    /// Signing a new token failed.
    #[error("failed to issue token")]
    TokenCreation,

    /// Hashing a password failed.
    #[error("failed to hash password")]
    HashFailure,
}

/// JWT claims carried by issued tokens.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject: the user id.
    sub: String,
    /// Expiry as a UTC unix timestamp.
    exp: usize,
}

/// The identity resolved by the auth gate, available to protected handlers
/// through request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Id of the authenticated user.
    pub id: String,
}

/// Issues a signed token embedding `user_id`, expiring one hour from now.
pub fn issue_token(user_id: &str, secret: &str) -> Result<String, AuthError> {
    let exp = (chrono::Utc::now() + chrono::Duration::seconds(TOKEN_TTL_SECS)).timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: exp as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::TokenCreation)
}

/// Verifies `token` and returns the embedded user id.
///
/// Fails with [`AuthError::ExpiredToken`] when the expiry has passed and
/// [`AuthError::InvalidToken`] for any other verification failure.
pub fn verify_token(token: &str, secret: &str) -> Result<String, AuthError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|err| match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?;

    Ok(data.claims.sub)
}

/// Hashes a password with Argon2 and a random 16-byte salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt: [u8; 16] = rand::random();
    argon2::hash_encoded(password.as_bytes(), &salt, &argon2::Config::default())
        .map_err(|_| AuthError::HashFailure)
}

/// Checks a password against a stored Argon2 hash.
///
/// A malformed stored hash counts as a mismatch rather than an error.
pub fn verify_password(encoded_hash: &str, password: &str) -> bool {
    argon2::verify_encoded(encoded_hash, password.as_bytes()).unwrap_or(false)
}

/// Auth gate middleware for protected routes.
///
/// Stateless per request: extracts and verifies the bearer token, then
/// inserts the resolved [`AuthUser`] into the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = header_value
        .strip_prefix(BEARER_PREFIX)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let user_id = verify_token(token, &state.config.jwt_secret).inspect_err(|err| {
        debug!(error = %err, "Rejected bearer token");
    })?;

    request.extensions_mut().insert(AuthUser { id: user_id });
    Ok(next.run(request).await)
}
