//! Service error types.
//!
//! Every variant maps to a stable error code and HTTP status.  The enum
//! implements [`axum::response::IntoResponse`] so handlers can simply
//! return `Err(ApiError::NotFound)`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Generate a 16-character hex request ID.
pub fn generate_request_id() -> String {
    let bytes: [u8; 8] = rand::random();
    hex::encode(bytes).to_uppercase()
}

/// Errors surfaced by the public operations.
///
/// Ownership mismatches are deliberately reported as [`ApiError::NotFound`]
/// rather than a forbidden variant so the existence of other users' files is
/// never disclosed.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request is malformed or missing required input.
    #[error("{message}")]
    Validation { message: String },

    /// The operation is not meaningful for the target's current state
    /// (e.g. reading content of a folder).
    #[error("{message}")]
    InvalidState { message: String },

    /// Missing, invalid, or expired credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// The target does not exist, or access is disguised as absence.
    #[error("Not found")]
    NotFound,

    /// A unique key (such as an email address) is already taken.
    #[error("{message}")]
    Conflict { message: String },

    /// Catch-all for backing-store failures and unexpected errors.
    #[error("We encountered an internal error, please try again.")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Return the stable error code string.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "ValidationError",
            ApiError::InvalidState { .. } => "InvalidStateError",
            ApiError::Unauthorized => "Unauthorized",
            ApiError::NotFound => "NotFound",
            ApiError::Conflict { .. } => "ConflictError",
            ApiError::Internal(_) => "InternalError",
        }
    }

    /// Return the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidState { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for an invalid-state failure.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        ApiError::InvalidState {
            message: message.into(),
        }
    }

    /// Shorthand for a unique-key conflict.
    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict {
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = generate_request_id();
        let status = self.status_code();
        let date = httpdate::fmt_http_date(std::time::SystemTime::now());

        // Internal errors log the cause but never expose it to the client.
        if let ApiError::Internal(ref err) = self {
            tracing::error!("internal error: {err:#}");
        }

        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        })
        .to_string();

        (
            status,
            [
                ("content-type", "application/json".to_string()),
                ("x-request-id", request_id),
                ("date", date),
                ("server", "FileDepot".to_string()),
            ],
            body,
        )
            .into_response()
    }
}

// -- Tests --------------------------------------------------------------------
