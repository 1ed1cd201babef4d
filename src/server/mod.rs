//! Axum HTTP layer.
//!
//! [`AppContext`] is the state shared by all route handlers; it is cheaply
//! cloneable because it only holds `Arc`s. [`create_router`] wires the HTML
//! pages, the JSON API, artifact downloads and static file serving together.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::gallery::OutputStore;
use crate::models::{
    BackgroundMatting, DiffusionRunner, MattingRunner, ModelRegistry, StyleRunner, StyleTransfer,
    TextToImage,
};

pub mod error;
pub mod routes_api;
pub mod routes_files;
pub mod routes_pages;

/// Maximum accepted upload size (original + custom background).
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub store: Arc<OutputStore>,
    pub generator: Arc<dyn TextToImage>,
    pub matting: Arc<dyn BackgroundMatting>,
    pub styler: Arc<dyn StyleTransfer>,
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let static_dir = ctx.config.server.static_dir.clone();
    let generated_dir = ctx.store.base_dir().to_path_buf();

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // HTML pages
        .route("/", get(routes_pages::index))
        .route("/background-removal", get(routes_pages::background_removal))
        .route("/generate", post(routes_pages::generate))
        .route("/remove_bg", post(routes_pages::remove_bg))
        // JSON API
        .route("/api/generate", post(routes_api::api_generate))
        .route("/api/remove_bg", post(routes_api::api_remove_bg))
        // Artifact downloads
        .route("/download/{filename}", get(routes_files::download))
        .route("/download-all", get(routes_files::download_all))
        .route("/favicon.ico", get(routes_files::favicon))
        // Artifacts are served under /static/generated regardless of where
        // the output directory actually lives on disk.
        .nest_service("/static/generated", ServeDir::new(&generated_dir))
        .nest_service("/static", ServeDir::new(&static_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server with production model runners.
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    std::fs::create_dir_all(&config.server.static_dir)
        .context("Failed to create static directory")?;
    let store = Arc::new(OutputStore::new(config.output.dir.clone()));
    store.ensure_dirs()?;

    let registry = Arc::new(ModelRegistry::discover(&config.models));
    for info in registry.check_all() {
        if info.available {
            tracing::info!("Model runner '{}' found at {:?}", info.name, info.path);
        } else {
            tracing::warn!(
                "Model runner '{}' not found; requests needing it will fail",
                info.name
            );
        }
    }

    let ctx = AppContext {
        config: Arc::new(config),
        store,
        generator: Arc::new(DiffusionRunner::new(registry.clone())),
        matting: Arc::new(MattingRunner::new(registry.clone())),
        styler: Arc::new(StyleRunner::new(registry)),
    };

    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
