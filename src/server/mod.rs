//! Plumage Server Module
//!
//! HTTP front end for the bird classifier. Exposes a multipart upload
//! endpoint and a health check.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use handlers::{UploadResponse, IMAGE_FIELD};
pub use state::AppState;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Default location of the ONNX model artifact
pub const DEFAULT_MODEL_PATH: &str = "Model/BirdsModel.onnx";

/// Default location of the label mapping
pub const DEFAULT_LABELS_PATH: &str = "Data/labels.json";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    pub max_upload_size: usize,
    pub cors_origin: Option<String>,
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            model_path: std::env::var("MODEL_PATH")
                .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
                .into(),
            labels_path: std::env::var("LABELS_PATH")
                .unwrap_or_else(|_| DEFAULT_LABELS_PATH.to_string())
                .into(),
            max_upload_size: std::env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16 * 1024 * 1024), // 16MB
            cors_origin: std::env::var("CORS_ORIGIN").ok(),
            debug: std::env::var("PLUMAGE_DEBUG")
                .map(|v| !matches!(v.as_str(), "0" | "false" | "off"))
                .unwrap_or(true),
        }
    }
}

/// Start the server with the given configuration
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    info!(
        model_path = %config.model_path.display(),
        labels_path = %config.labels_path.display(),
        "Loading model and labels"
    );

    let state = Arc::new(AppState::new(config.clone()));
    if !state.engine.is_ready() {
        warn!("Model or labels unavailable; uploads will be answered with 500 until restart");
    }

    let app = create_router(Arc::clone(&state), &config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        address = %addr,
        max_upload_size_mb = config.max_upload_size / 1024 / 1024,
        debug = config.debug,
        started_at = %start_time.to_rfc3339(),
        "Plumage server starting"
    );
    info!(url = %format!("http://{}/api/upload", addr), "Upload endpoint available");
    info!(url = %format!("http://{}/api/health", addr), "Health endpoint available");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}
