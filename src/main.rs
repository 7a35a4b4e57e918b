//! FileDepot -- authenticated file-storage server.
//!
//! Startup is idempotent: schema init and directory creation are safe to
//! repeat, so every start doubles as recovery. SIGTERM/SIGINT handlers
//! only stop accepting connections and wait for in-flight requests.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

/// Command-line arguments for the FileDepot server.
#[derive(Parser, Debug)]
#[command(
    name = "filedepot",
    version,
    about = "Authenticated file-storage server"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = "filedepot.example.yaml")]
    config: String,

    /// Override the bind address (host:port).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing / logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!("Loading configuration from {}", cli.config);
    let config = filedepot::config::load_config(&cli.config)?;

    let bind_addr = cli
        .bind
        .unwrap_or_else(|| format!("{}:{}", config.server.host, config.server.port));

    // Initialize Prometheus metrics recorder and register metric descriptions.
    filedepot::metrics::init_metrics();
    filedepot::metrics::describe_metrics();
    info!("Prometheus metrics initialized");

    // Initialize metadata store based on config.
    let metadata: Arc<dyn filedepot::metadata::store::MetadataStore> =
        match config.metadata.engine.as_str() {
            "memory" => {
                info!("In-memory metadata store initialized");
                Arc::new(filedepot::metadata::memory::MemoryMetadataStore::new())
            }
            _ => {
                let metadata_path = &config.metadata.sqlite.path;
                // Ensure parent directory exists for the SQLite file.
                if let Some(parent) = std::path::Path::new(metadata_path).parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let store =
                    filedepot::metadata::sqlite::SqliteMetadataStore::new(metadata_path)?;
                info!("SQLite metadata store initialized at {}", metadata_path);
                Arc::new(store)
            }
        };

    // Initialize content store based on config.
    let content: Arc<dyn filedepot::storage::backend::ContentStore> =
        match config.content.backend.as_str() {
            "memory" => {
                info!("In-memory content store initialized");
                Arc::new(filedepot::storage::memory::MemoryContentStore::new())
            }
            _ => {
                let content_root = &config.content.local.root_dir;
                let store = filedepot::storage::local::LocalContentStore::new(content_root)?;
                info!("Local content store initialized at {}", content_root);
                Arc::new(store)
            }
        };

    // Sessions are volatile by design: restart invalidates all tokens.
    let ttl = Duration::from_secs(config.session.ttl_seconds);
    let sessions: Arc<dyn filedepot::session::store::SessionStore> =
        Arc::new(filedepot::session::memory::MemorySessionStore::new(ttl));
    info!("Session store initialized, ttl {}s", config.session.ttl_seconds);

    // Build AppState.
    let state = Arc::new(filedepot::AppState {
        config: config.clone(),
        metadata,
        sessions,
        content,
    });

    let app = filedepot::server::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("FileDepot listening on {}", bind_addr);

    // Graceful shutdown: on SIGTERM/SIGINT, stop accepting new connections,
    // wait for in-flight requests to complete, then exit.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("FileDepot shut down");

    Ok(())
}

/// Wait for SIGTERM or SIGINT (Ctrl+C), then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        },
    }
}
