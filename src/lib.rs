//! FileDepot library — authenticated file-storage service.
//!
//! This crate provides the core components for running a small
//! file-storage server: registration and token sessions, a per-user
//! folder/file tree with public/private visibility, metadata indexing,
//! and durable content storage decoupled from the index.

use std::sync::Arc;

pub mod access;
pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod metadata;
pub mod metrics;
pub mod server;
pub mod session;
pub mod storage;
pub mod views;

use crate::config::Config;
use crate::metadata::store::MetadataStore;
use crate::session::store::SessionStore;
use crate::storage::backend::ContentStore;

/// Shared application state passed to all handlers via `axum::extract::State`.
pub struct AppState {
    /// Server configuration.
    pub config: Config,
    /// Metadata store (users + file tree).
    pub metadata: Arc<dyn MetadataStore>,
    /// Volatile session store (token → user).
    pub sessions: Arc<dyn SessionStore>,
    /// Content store (raw file bytes).
    pub content: Arc<dyn ContentStore>,
}
