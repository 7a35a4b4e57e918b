//! User handlers: registration and identity lookup.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::access;
use crate::auth;
use crate::errors::ApiError;
use crate::metadata::store::{now_iso8601, UserRecord};
use crate::views::UserView;
use crate::AppState;

/// Request body for `POST /users`.
///
/// Fields are optional at the serde level so that missing input surfaces
/// as a validation error with a stable shape instead of a
/// deserialization rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// `POST /users` -- Register a new user.
///
/// Validation and the duplicate check run before any write. The
/// duplicate check is an exact, case-sensitive email match.
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    operation_id = "Register",
    responses(
        (status = 201, description = "User created", body = UserView),
        (status = 400, description = "Missing email or password"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let email = body
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::validation("Missing email"))?;
    let password = body
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::validation("Missing password"))?;

    if state.metadata.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }

    let record = UserRecord {
        id: uuid::Uuid::new_v4().to_string(),
        email,
        password_hash: auth::hash_password(&password)?,
        created_at: now_iso8601(),
    };
    state.metadata.create_user(record.clone()).await?;

    tracing::info!(user_id = %record.id, "user registered");

    Ok((StatusCode::CREATED, Json(UserView::from(&record))).into_response())
}

/// `GET /users/me` -- Return the identity behind the request's token.
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    operation_id = "WhoAmI",
    responses(
        (status = 200, description = "Authenticated user", body = UserView),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn whoami(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let user = access::require_user(&state, &headers).await?;
    Ok((StatusCode::OK, Json(UserView::from(&user))).into_response())
}
