//! Error types for the Gatherly server.
//!
//! [`ApiError`] is the handler-boundary error type: every failure a route
//! handler can produce maps onto exactly one HTTP status and a JSON body of
//! the form `{ "error": <message>, "code": <code> }`. Errors are never
//! retried and never crash the process.
//!
//! Lower layers carry their own error enums ([`AuthError`](crate::auth::AuthError),
//! [`StoreError`](crate::store::StoreError), `ConfigError`) which convert
//! into `ApiError` at the handler boundary via `From`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;
use crate::store::StoreError;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Top-level error type for API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A request field failed validation (missing or empty required value).
    #[error("validation error: {0}")]
    Validation(String),

    /// Signup attempted with an already-registered email.
    #[error("user already exists")]
    DuplicateUser,

    /// Login failed: unknown email or password mismatch.
    ///
    /// Both cases produce the same message so the response does not reveal
    /// which emails are registered.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Bearer token missing, malformed, expired, or not verifiable.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Authenticated caller is not the owner of the targeted event.
    #[error("unauthorized")]
    Forbidden,

    /// The addressed resource does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Persistence failure. The detail is logged; clients get a generic body.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::DuplicateUser | Self::InvalidCredentials => {
                StatusCode::BAD_REQUEST
            }
            Self::Auth(AuthError::TokenCreation | AuthError::HashFailure) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code included in the JSON body.
    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::DuplicateUser => "duplicate_user",
            Self::InvalidCredentials => "invalid_credentials",
            Self::Auth(AuthError::TokenCreation | AuthError::HashFailure) => "internal",
            Self::Auth(_) => "authentication",
            Self::Forbidden => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Store(_) => "store",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Store(err) => {
                error!(error = %err, "Store operation failed");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        (
            self.status(),
            Json(ErrorResponse::new(message).with_code(self.code())),
        )
            .into_response()
    }
}
