//! Access gate: token resolution and per-operation authorization.
//!
//! Every authenticated request resolves its token to a user here before
//! touching the metadata or content stores.  Ownership mismatches are
//! reported as `NotFound` throughout so the existence of other users'
//! files is never disclosed.

use axum::http::HeaderMap;
use bytes::Bytes;

use crate::errors::ApiError;
use crate::metadata::store::{FileKind, FileRecord, UserRecord};
use crate::AppState;

/// Name of the request header carrying the session token.
pub const TOKEN_HEADER: &str = "x-token";

/// Extract the session token from request headers, if present.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Resolve the request's token to a user record.
///
/// Missing, unknown, or expired tokens — and tokens whose user no longer
/// resolves — all fail with `Unauthorized`.
pub async fn require_user(state: &AppState, headers: &HeaderMap) -> Result<UserRecord, ApiError> {
    let token = token_from_headers(headers).ok_or(ApiError::Unauthorized)?;
    resolve_user(state, &token).await
}

/// Resolve a token string to a user record.
pub async fn resolve_user(state: &AppState, token: &str) -> Result<UserRecord, ApiError> {
    let user_id = state
        .sessions
        .resolve(token)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    state
        .metadata
        .get_user(&user_id)
        .await?
        .ok_or(ApiError::Unauthorized)
}

/// Authorize a content read and return the bytes.
///
/// Folders never satisfy a content read, regardless of visibility or
/// ownership. Private content requires a token resolving to the owner;
/// any other caller sees `NotFound`. A dangling content reference (index
/// row without bytes) is also `NotFound`.
pub async fn read_content(
    state: &AppState,
    file: &FileRecord,
    headers: &HeaderMap,
) -> Result<Bytes, ApiError> {
    if file.kind == FileKind::Folder {
        return Err(ApiError::invalid_state("A folder doesn't have content"));
    }

    if !file.is_public {
        let owner = match token_from_headers(headers) {
            Some(token) => resolve_user(state, &token).await.ok(),
            None => None,
        };
        match owner {
            Some(user) if user.id == file.owner_id => {}
            _ => return Err(ApiError::NotFound),
        }
    }

    let content_ref = file.content_ref.as_deref().ok_or(ApiError::NotFound)?;
    state
        .content
        .read(content_ref)
        .await?
        .ok_or(ApiError::NotFound)
}

// -- Tests --------------------------------------------------------------------
