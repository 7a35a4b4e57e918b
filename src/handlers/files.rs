//! File tree handlers: create/upload, show, list, visibility, download.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::Engine;
use bytes::Bytes;
use garde::Validate;
use metrics::counter;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::access;
use crate::errors::ApiError;
use crate::metadata::store::{
    now_iso8601, FileKind, FileRecord, ParentRef, DEFAULT_PAGE_SIZE,
};
use crate::metrics::{CONTENT_BYTES_WRITTEN_TOTAL, UPLOADS_TOTAL};
use crate::views::FileView;
use crate::AppState;

// -- Input validation ---------------------------------------------------------

/// Validation rules for node names.
#[derive(Debug, Validate)]
pub struct NodeNameInput {
    /// 1-255 characters, no path separators.
    #[garde(length(min = 1, max = 255), pattern(r"^[^/\\]+$"))]
    pub name: String,
}

/// Validate a node name, mapping any violation to a `ValidationError`.
fn validate_node_name(name: &str) -> Result<(), ApiError> {
    NodeNameInput {
        name: name.to_string(),
    }
    .validate()
    .map_err(|_| ApiError::validation("Invalid name"))
}

// -- Request types ------------------------------------------------------------

/// Request body for `POST /files`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    /// Parent node id, or the literal `root` (the default).
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    /// Base64-encoded content. Required for non-folder kinds.
    #[serde(default)]
    pub data: Option<String>,
}

/// Query parameters for `GET /files`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Parent node id, or the literal `root` (the default).
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Zero-based page index.
    #[serde(default)]
    pub page: u32,
}

// -- Handlers -----------------------------------------------------------------

/// `POST /files` -- Create a folder or upload a file.
///
/// For non-root parents, the parent must exist, belong to the caller,
/// and be a folder. Content bytes are persisted before the index row is
/// inserted, so an index entry is never observed without its bytes.
#[utoipa::path(
    post,
    path = "/files",
    tag = "Files",
    operation_id = "CreateFile",
    responses(
        (status = 201, description = "Node created", body = FileView),
        (status = 400, description = "Invalid name, kind, data, or parent state"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Parent not found")
    )
)]
pub async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateFileRequest>,
) -> Result<Response, ApiError> {
    let user = access::require_user(&state, &headers).await?;

    let name = body
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::validation("Missing name"))?;
    validate_node_name(&name)?;

    let kind = body
        .kind
        .as_deref()
        .and_then(FileKind::parse)
        .ok_or_else(|| ApiError::validation("Missing or unrecognized kind"))?;

    let parent = ParentRef::from_token(body.parent_id.as_deref().unwrap_or("root"));
    if let ParentRef::Node(parent_id) = &parent {
        let parent_node = state
            .metadata
            .get_file(parent_id)
            .await?
            .ok_or(ApiError::NotFound)?;
        // A foreign parent is indistinguishable from a missing one.
        if parent_node.owner_id != user.id {
            return Err(ApiError::NotFound);
        }
        if parent_node.kind != FileKind::Folder {
            return Err(ApiError::invalid_state("Parent is not a folder"));
        }
    }

    // Content first, index second: the node id is only published once the
    // bytes behind it are durable.
    let content_ref = if kind == FileKind::Folder {
        // Folders never carry content; any supplied data is ignored.
        None
    } else {
        let encoded = body
            .data
            .filter(|d| !d.is_empty())
            .ok_or_else(|| ApiError::validation("Missing data"))?;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|_| ApiError::validation("Invalid base64 data"))?;

        counter!(CONTENT_BYTES_WRITTEN_TOTAL).increment(decoded.len() as u64);
        Some(state.content.write(Bytes::from(decoded)).await?)
    };

    let record = FileRecord {
        id: uuid::Uuid::new_v4().to_string(),
        owner_id: user.id,
        name,
        kind,
        parent,
        is_public: body.is_public,
        content_ref,
        created_at: now_iso8601(),
    };
    state.metadata.insert_file(record.clone()).await?;

    counter!(UPLOADS_TOTAL, "kind" => kind.as_str()).increment(1);
    tracing::info!(node_id = %record.id, kind = kind.as_str(), "node created");

    Ok((StatusCode::CREATED, Json(FileView::from(&record))).into_response())
}

/// `GET /files/{id}` -- Return a node's metadata.
///
/// Owner-scoped: other users' nodes, public or not, read as absent.
#[utoipa::path(
    get,
    path = "/files/{id}",
    tag = "Files",
    operation_id = "ShowFile",
    params(("id" = String, Path, description = "Node id")),
    responses(
        (status = 200, description = "Node metadata", body = FileView),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Node not found")
    )
)]
pub async fn show(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let user = access::require_user(&state, &headers).await?;

    let file = state
        .metadata
        .get_file_owned(&id, &user.id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok((StatusCode::OK, Json(FileView::from(&file))).into_response())
}

/// `GET /files` -- List the caller's direct children of a parent node.
///
/// Pages are `DEFAULT_PAGE_SIZE` entries in insertion order; pages past
/// the end are empty, never an error.
#[utoipa::path(
    get,
    path = "/files",
    tag = "Files",
    operation_id = "ListFiles",
    params(
        ("parentId" = Option<String>, Query, description = "Parent node id, default root"),
        ("page" = Option<u32>, Query, description = "Zero-based page index")
    ),
    responses(
        (status = 200, description = "Child node metadata", body = [FileView]),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let user = access::require_user(&state, &headers).await?;

    let parent = ParentRef::from_token(query.parent_id.as_deref().unwrap_or("root"));
    let children = state
        .metadata
        .list_children(&user.id, &parent, query.page, DEFAULT_PAGE_SIZE)
        .await?;

    let views: Vec<FileView> = children.iter().map(FileView::from).collect();
    Ok((StatusCode::OK, Json(views)).into_response())
}

/// `PUT /files/{id}/publish` -- Make a node's content publicly readable.
#[utoipa::path(
    put,
    path = "/files/{id}/publish",
    tag = "Files",
    operation_id = "PublishFile",
    params(("id" = String, Path, description = "Node id")),
    responses(
        (status = 200, description = "Updated node metadata", body = FileView),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Node not found")
    )
)]
pub async fn publish(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    set_visibility(state, headers, id, true).await
}

/// `PUT /files/{id}/unpublish` -- Make a node's content private again.
#[utoipa::path(
    put,
    path = "/files/{id}/unpublish",
    tag = "Files",
    operation_id = "UnpublishFile",
    params(("id" = String, Path, description = "Node id")),
    responses(
        (status = 200, description = "Updated node metadata", body = FileView),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Node not found")
    )
)]
pub async fn unpublish(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    set_visibility(state, headers, id, false).await
}

/// Shared visibility mutation. Only the owner may toggle; everyone else
/// — including holders of valid tokens for other users — sees `NotFound`.
async fn set_visibility(
    state: Arc<AppState>,
    headers: HeaderMap,
    id: String,
    is_public: bool,
) -> Result<Response, ApiError> {
    let user = access::require_user(&state, &headers).await?;

    let updated = state
        .metadata
        .set_visibility(&id, &user.id, is_public)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok((StatusCode::OK, Json(FileView::from(&updated))).into_response())
}

/// `GET /files/{id}/data` -- Stream a node's content bytes.
///
/// Public nodes need no token; private nodes require the owner's token.
/// The content type is guessed from the node name.
#[utoipa::path(
    get,
    path = "/files/{id}/data",
    tag = "Files",
    operation_id = "ReadFileContent",
    params(("id" = String, Path, description = "Node id")),
    responses(
        (status = 200, description = "Raw content bytes"),
        (status = 400, description = "Node is a folder"),
        (status = 404, description = "Node or content not found")
    )
)]
pub async fn download(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let file = state
        .metadata
        .get_file(&id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let data = access::read_content(&state, &file, &headers).await?;

    let content_type = mime_guess::from_path(&file.name)
        .first_or_octet_stream()
        .to_string();

    Ok((
        StatusCode::OK,
        [("content-type", content_type)],
        data,
    )
        .into_response())
}

// -- Tests --------------------------------------------------------------------
