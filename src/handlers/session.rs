//! Session handlers: login and logout.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::access;
use crate::auth;
use crate::errors::ApiError;
use crate::views::TokenView;
use crate::AppState;

/// `GET /connect` -- Exchange Basic credentials for a session token.
///
/// Every failure — missing header, malformed credentials, unknown email,
/// wrong password — is the same `Unauthorized`, so callers cannot tell
/// which check rejected them.
#[utoipa::path(
    get,
    path = "/connect",
    tag = "Session",
    operation_id = "Connect",
    responses(
        (status = 200, description = "Session created", body = TokenView),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn connect(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let (email, password) =
        auth::parse_basic_credentials(authorization).ok_or(ApiError::Unauthorized)?;

    let user = state
        .metadata
        .find_user_by_email(&email)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !auth::verify_password(&password, &user.password_hash) {
        return Err(ApiError::Unauthorized);
    }

    let token = state.sessions.login(&user.id).await?;

    tracing::debug!(user_id = %user.id, "session created");

    Ok((StatusCode::OK, Json(TokenView { token })).into_response())
}

/// `GET /disconnect` -- Destroy the request's session.
///
/// A token that does not resolve (never issued, already logged out, or
/// expired) reports `Unauthorized`.
#[utoipa::path(
    get,
    path = "/disconnect",
    tag = "Session",
    operation_id = "Disconnect",
    responses(
        (status = 204, description = "Session destroyed"),
        (status = 401, description = "Missing or unknown token")
    )
)]
pub async fn disconnect(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let token = access::token_from_headers(&headers).ok_or(ApiError::Unauthorized)?;

    if !state.sessions.logout(&token).await? {
        return Err(ApiError::Unauthorized);
    }

    Ok(StatusCode::NO_CONTENT.into_response())
}
