//! Axum router construction and route mapping.
//!
//! The [`app`] function wires every endpoint to its handler and returns
//! a ready-to-serve [`axum::Router`].

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::errors::generate_request_id;
use crate::metrics::{metrics_handler, metrics_middleware};
use crate::AppState;

// -- OpenAPI specification ----------------------------------------------------

/// OpenAPI documentation for the FileDepot API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "FileDepot API",
        version = "0.1.0",
        description = "Authenticated file-storage service"
    ),
    paths(
        // Health and service level
        health_check,
        crate::handlers::app::status,
        crate::handlers::app::stats,
        // Users
        crate::handlers::users::register,
        crate::handlers::users::whoami,
        // Sessions
        crate::handlers::session::connect,
        crate::handlers::session::disconnect,
        // Files
        crate::handlers::files::create,
        crate::handlers::files::show,
        crate::handlers::files::list,
        crate::handlers::files::publish,
        crate::handlers::files::unpublish,
        crate::handlers::files::download,
    ),
    components(schemas(
        crate::views::FileView,
        crate::views::UserView,
        crate::views::TokenView,
        crate::views::StatusView,
        crate::views::StatsView,
    )),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "App", description = "Service status and statistics"),
        (name = "Users", description = "Registration and identity"),
        (name = "Session", description = "Login and logout"),
        (name = "Files", description = "File tree and content operations"),
    )
)]
struct ApiDoc;

/// Build the axum [`Router`] with all routes.
///
/// The returned router is ready to be passed to `axum::serve`.
pub fn app(state: Arc<AppState>) -> Router {
    let max_upload = state.config.server.max_upload_size as usize;

    Router::new()
        // Infrastructure endpoints.
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/openapi.json", get(openapi_spec))
        // Service level.
        .route("/status", get(crate::handlers::app::status))
        .route("/stats", get(crate::handlers::app::stats))
        // Users.
        .route("/users", post(crate::handlers::users::register))
        .route("/users/me", get(crate::handlers::users::whoami))
        // Sessions.
        .route("/connect", get(crate::handlers::session::connect))
        .route("/disconnect", get(crate::handlers::session::disconnect))
        // Files.
        .route(
            "/files",
            post(crate::handlers::files::create).get(crate::handlers::files::list),
        )
        .route("/files/:id", get(crate::handlers::files::show))
        .route("/files/:id/publish", put(crate::handlers::files::publish))
        .route(
            "/files/:id/unpublish",
            put(crate::handlers::files::unpublish),
        )
        .route("/files/:id/data", get(crate::handlers::files::download))
        // Application state shared across all handlers.
        .with_state(state)
        // Layer ordering: inner layers run first, outer layers wrap them.
        .layer(middleware::from_fn(common_headers_middleware))
        .layer(TraceLayer::new_for_http())
        // metrics_middleware is outermost (captures full request lifecycle).
        .layer(middleware::from_fn(metrics_middleware))
        // Uploads arrive base64-encoded in a JSON body.
        .layer(DefaultBodyLimit::max(max_upload))
}

// -- Common headers middleware -----------------------------------------------

/// Tower middleware that adds common response headers to every response:
/// - `x-request-id`: 16-character uppercase hex string
/// - `Date`: RFC 7231 formatted timestamp
/// - `Server`: `FileDepot`
async fn common_headers_middleware(req: Request<axum::body::Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    // Only set x-request-id if not already present (error handler may set it).
    if !headers.contains_key("x-request-id") {
        let request_id = generate_request_id();
        headers.insert(
            "x-request-id",
            HeaderValue::from_str(&request_id).unwrap(),
        );
    }

    let date = httpdate::fmt_http_date(std::time::SystemTime::now());
    // Always overwrite Date and Server to ensure consistency.
    headers.insert("date", HeaderValue::from_str(&date).unwrap());
    headers.insert("server", HeaderValue::from_static("FileDepot"));

    response
}

// -- Health check ------------------------------------------------------------

/// `GET /health` -- Returns `{"status": "ok"}` with 200 OK.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    operation_id = "HealthCheck",
    responses(
        (status = 200, description = "Health check OK")
    )
)]
async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "application/json")],
        r#"{"status":"ok"}"#,
    )
}

/// `GET /openapi.json` -- The generated OpenAPI document.
async fn openapi_spec() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::metadata::memory::MemoryMetadataStore;
    use crate::session::memory::MemorySessionStore;
    use crate::storage::memory::MemoryContentStore;
    use axum::body::Body;
    use base64::Engine;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn test_app() -> Router {
        let state = Arc::new(AppState {
            config: Config::default(),
            metadata: Arc::new(MemoryMetadataStore::new()),
            sessions: Arc::new(MemorySessionStore::new(Duration::from_secs(3600))),
            content: Arc::new(MemoryContentStore::new()),
        });
        app(state)
    }

    fn b64(data: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(data)
    }

    fn basic_auth(email: &str, password: &str) -> String {
        format!("Basic {}", b64(format!("{email}:{password}").as_bytes()))
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("x-token", token);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_req(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header("x-token", token);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn put_req(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("PUT").uri(uri);
        if let Some(token) = token {
            builder = builder.header("x-token", token);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn register(app: &Router, email: &str, password: &str) -> Value {
        let (status, body) = send(
            app,
            post_json("/users", None, json!({"email": email, "password": password})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    async fn connect(app: &Router, email: &str, password: &str) -> String {
        let req = Request::builder()
            .method("GET")
            .uri("/connect")
            .header("authorization", basic_auth(email, password))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app();
        let (status, body) = send(&app, get_req("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_common_headers_present() {
        let app = test_app();
        let response = app.clone().oneshot(get_req("/health", None)).await.unwrap();
        assert_eq!(
            response.headers().get("server").unwrap(),
            &HeaderValue::from_static("FileDepot")
        );
        assert!(response.headers().contains_key("x-request-id"));
        assert!(response.headers().contains_key("date"));
    }

    #[tokio::test]
    async fn test_register_validations() {
        let app = test_app();

        let (status, body) = send(&app, post_json("/users", None, json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "ValidationError");
        assert_eq!(body["error"]["message"], "Missing email");

        let (status, body) =
            send(&app, post_json("/users", None, json!({"email": "a@x.com"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Missing password");
    }

    #[tokio::test]
    async fn test_register_conflict_on_duplicate_email() {
        let app = test_app();
        register(&app, "a@x.com", "pw").await;

        // Same email, different password: still a conflict.
        let (status, body) = send(
            &app,
            post_json("/users", None, json!({"email": "a@x.com", "password": "other"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "ConflictError");
    }

    #[tokio::test]
    async fn test_connect_failures_are_uniform() {
        let app = test_app();
        register(&app, "a@x.com", "pw").await;

        // Unknown email and wrong password produce the same response shape.
        for auth in [
            basic_auth("nobody@x.com", "pw"),
            basic_auth("a@x.com", "wrong"),
        ] {
            let req = Request::builder()
                .method("GET")
                .uri("/connect")
                .header("authorization", auth)
                .body(Body::empty())
                .unwrap();
            let (status, body) = send(&app, req).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["error"]["code"], "Unauthorized");
        }

        // No header at all.
        let (status, _) = send(&app, get_req("/connect", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_whoami_and_disconnect() {
        let app = test_app();
        let user = register(&app, "a@x.com", "pw").await;
        let token = connect(&app, "a@x.com", "pw").await;

        let (status, body) = send(&app, get_req("/users/me", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], user["id"]);
        assert_eq!(body["email"], "a@x.com");

        let (status, _) = send(&app, get_req("/disconnect", Some(&token))).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        // The token no longer resolves.
        let (status, _) = send(&app, get_req("/users/me", Some(&token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // A second disconnect is a reported no-op.
        let (status, _) = send(&app, get_req("/disconnect", Some(&token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_upload_requires_token() {
        let app = test_app();
        let (status, _) = send(
            &app,
            post_json("/files", None, json!({"name": "docs", "kind": "folder"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_upload_validations() {
        let app = test_app();
        register(&app, "a@x.com", "pw").await;
        let token = connect(&app, "a@x.com", "pw").await;

        // Missing name.
        let (status, body) = send(
            &app,
            post_json("/files", Some(&token), json!({"kind": "folder"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Missing name");

        // Unrecognized kind.
        let (status, body) = send(
            &app,
            post_json("/files", Some(&token), json!({"name": "x", "kind": "directory"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "ValidationError");

        // Non-folder without data.
        let (status, body) = send(
            &app,
            post_json("/files", Some(&token), json!({"name": "x", "kind": "file"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Missing data");

        // Bad base64.
        let (status, _) = send(
            &app,
            post_json(
                "/files",
                Some(&token),
                json!({"name": "x", "kind": "file", "data": "!!!not-base64!!!"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_parent_validation() {
        let app = test_app();
        register(&app, "a@x.com", "pw").await;
        let token = connect(&app, "a@x.com", "pw").await;

        // Nonexistent parent.
        let (status, body) = send(
            &app,
            post_json(
                "/files",
                Some(&token),
                json!({"name": "x", "kind": "folder", "parentId": uuid::Uuid::new_v4().to_string()}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NotFound");

        // Parent that is not a folder.
        let (_, note) = send(
            &app,
            post_json(
                "/files",
                Some(&token),
                json!({"name": "note.txt", "kind": "file", "data": b64(b"hi")}),
            ),
        )
        .await;
        let (status, body) = send(
            &app,
            post_json(
                "/files",
                Some(&token),
                json!({"name": "x", "kind": "folder", "parentId": note["id"]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "InvalidStateError");

        // Someone else's folder reads as absent.
        register(&app, "b@x.com", "pw").await;
        let other_token = connect(&app, "b@x.com", "pw").await;
        let (_, foreign_folder) = send(
            &app,
            post_json(
                "/files",
                Some(&other_token),
                json!({"name": "theirs", "kind": "folder"}),
            ),
        )
        .await;
        let (status, _) = send(
            &app,
            post_json(
                "/files",
                Some(&token),
                json!({"name": "x", "kind": "folder", "parentId": foreign_folder["id"]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_show_is_owner_scoped() {
        let app = test_app();
        register(&app, "a@x.com", "pw").await;
        register(&app, "b@x.com", "pw").await;
        let token_a = connect(&app, "a@x.com", "pw").await;
        let token_b = connect(&app, "b@x.com", "pw").await;

        let (_, node) = send(
            &app,
            post_json(
                "/files",
                Some(&token_a),
                json!({"name": "note.txt", "kind": "file", "data": b64(b"hi"), "isPublic": true}),
            ),
        )
        .await;
        let id = node["id"].as_str().unwrap();

        let (status, shown) = send(&app, get_req(&format!("/files/{id}"), Some(&token_a))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(shown["id"], node["id"]);

        // Even a public node is hidden from other users' show.
        let (status, _) = send(&app, get_req(&format!("/files/{id}"), Some(&token_b))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_publish_is_owner_scoped() {
        let app = test_app();
        register(&app, "a@x.com", "pw").await;
        register(&app, "b@x.com", "pw").await;
        let token_a = connect(&app, "a@x.com", "pw").await;
        let token_b = connect(&app, "b@x.com", "pw").await;

        let (_, node) = send(
            &app,
            post_json(
                "/files",
                Some(&token_a),
                json!({"name": "note.txt", "kind": "file", "data": b64(b"hi")}),
            ),
        )
        .await;
        let id = node["id"].as_str().unwrap();

        // Non-owner mutation reads as absence.
        let (status, _) = send(
            &app,
            put_req(&format!("/files/{id}/publish"), Some(&token_b)),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // Unknown node for the owner, too.
        let (status, _) = send(
            &app,
            put_req(
                &format!("/files/{}/publish", uuid::Uuid::new_v4()),
                Some(&token_a),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_folder_has_no_content() {
        let app = test_app();
        register(&app, "a@x.com", "pw").await;
        let token = connect(&app, "a@x.com", "pw").await;

        let (_, folder) = send(
            &app,
            post_json("/files", Some(&token), json!({"name": "docs", "kind": "folder"})),
        )
        .await;
        let id = folder["id"].as_str().unwrap();

        // Owner with token: still invalid.
        let (status, body) =
            send(&app, get_req(&format!("/files/{id}/data"), Some(&token))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "InvalidStateError");

        // Published folder, anonymous: still invalid, not 404.
        send(&app, put_req(&format!("/files/{id}/publish"), Some(&token))).await;
        let (status, body) = send(&app, get_req(&format!("/files/{id}/data"), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "InvalidStateError");
    }

    #[tokio::test]
    async fn test_list_pagination_past_end_is_empty() {
        let app = test_app();
        register(&app, "a@x.com", "pw").await;
        let token = connect(&app, "a@x.com", "pw").await;

        let (status, body) = send(&app, get_req("/files?page=7", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_status_and_stats() {
        let app = test_app();
        register(&app, "a@x.com", "pw").await;
        let token = connect(&app, "a@x.com", "pw").await;
        send(
            &app,
            post_json("/files", Some(&token), json!({"name": "docs", "kind": "folder"})),
        )
        .await;

        let (status, body) = send(&app, get_req("/status", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sessions"], true);
        assert_eq!(body["index"], true);

        let (status, body) = send(&app, get_req("/stats", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["users"], 1);
        assert_eq!(body["files"], 1);
    }

    #[tokio::test]
    async fn test_openapi_document_served() {
        let app = test_app();
        let (status, body) = send(&app, get_req("/openapi.json", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/files"].is_object());
        assert!(body["paths"]["/connect"].is_object());
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let app = test_app();
        let content = b"Hello file world";

        // Register and log in.
        register(&app, "a@x.com", "pw").await;
        let token = connect(&app, "a@x.com", "pw").await;

        // Create a folder under root.
        let (status, docs) = send(
            &app,
            post_json("/files", Some(&token), json!({"name": "docs", "kind": "folder"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(docs["kind"], "folder");
        assert_eq!(docs["parentId"], "root");
        assert_eq!(docs["isPublic"], false);
        let docs_id = docs["id"].as_str().unwrap();

        // Upload a file into the folder.
        let (status, note) = send(
            &app,
            post_json(
                "/files",
                Some(&token),
                json!({
                    "name": "note.txt",
                    "kind": "file",
                    "parentId": docs_id,
                    "data": b64(content),
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(note["parentId"], docs_id);
        let note_id = note["id"].as_str().unwrap();

        // Root listing shows only the folder; folder listing only the file.
        let (_, root_list) = send(&app, get_req("/files", Some(&token))).await;
        let root_list = root_list.as_array().unwrap().clone();
        assert_eq!(root_list.len(), 1);
        assert_eq!(root_list[0]["id"].as_str().unwrap(), docs_id);

        let (_, folder_list) = send(
            &app,
            get_req(&format!("/files?parentId={docs_id}"), Some(&token)),
        )
        .await;
        let folder_list = folder_list.as_array().unwrap().clone();
        assert_eq!(folder_list.len(), 1);
        assert_eq!(folder_list[0]["id"].as_str().unwrap(), note_id);

        // Private content: anonymous read is disguised as absence.
        let (status, body) = send(&app, get_req(&format!("/files/{note_id}/data"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NotFound");

        // The owner publishes it.
        let (status, published) = send(
            &app,
            put_req(&format!("/files/{note_id}/publish"), Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(published["isPublic"], true);

        // Anonymous read now returns the original bytes with a guessed type.
        let response = app
            .clone()
            .oneshot(get_req(&format!("/files/{note_id}/data"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            &HeaderValue::from_static("text/plain")
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], content);

        // Unpublish takes it private again.
        let (status, unpublished) = send(
            &app,
            put_req(&format!("/files/{note_id}/unpublish"), Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(unpublished["isPublic"], false);
        let (status, _) = send(&app, get_req(&format!("/files/{note_id}/data"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
