//! Service-level handlers: backend liveness and entity counts.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::errors::ApiError;
use crate::views::{StatsView, StatusView};
use crate::AppState;

/// `GET /status` -- Report liveness of the session store and the
/// metadata store. Always 200; failing backends show up as `false`.
#[utoipa::path(
    get,
    path = "/status",
    tag = "App",
    operation_id = "GetStatus",
    responses(
        (status = 200, description = "Backend liveness", body = StatusView)
    )
)]
pub async fn status(State(state): State<Arc<AppState>>) -> Response {
    let view = StatusView {
        sessions: state.sessions.ping().await.is_ok(),
        index: state.metadata.ping().await.is_ok(),
    };
    (StatusCode::OK, Json(view)).into_response()
}

/// `GET /stats` -- Report the number of registered users and file nodes.
#[utoipa::path(
    get,
    path = "/stats",
    tag = "App",
    operation_id = "GetStats",
    responses(
        (status = 200, description = "Entity counts", body = StatsView),
        (status = 500, description = "Backing store failure")
    )
)]
pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let view = StatsView {
        users: state.metadata.count_users().await?,
        files: state.metadata.count_files().await?,
    };
    Ok((StatusCode::OK, Json(view)).into_response())
}
