//! Application state management

use crate::inference::{InferenceConfig, InferenceEngine};

use super::ServerConfig;

/// Application state shared across handlers.
///
/// Built once before the router starts serving; nothing in it is
/// reassigned afterwards.
pub struct AppState {
    pub config: ServerConfig,
    pub engine: InferenceEngine,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Load model and labels from the configured paths
    pub fn new(config: ServerConfig) -> Self {
        let engine = InferenceEngine::load(
            InferenceConfig::default(),
            &config.model_path,
            &config.labels_path,
        );
        Self::with_engine(config, engine)
    }

    /// Wrap an already-built engine
    pub fn with_engine(config: ServerConfig, engine: InferenceEngine) -> Self {
        Self {
            config,
            engine,
            started_at: chrono::Utc::now(),
        }
    }

    /// Health snapshot for `/api/health`
    pub fn health(&self) -> serde_json::Value {
        let labels_loaded = self.engine.labels().is_some();
        serde_json::json!({
            "status": if self.engine.is_ready() { "ok" } else { "degraded" },
            "model_loaded": self.engine.has_model(),
            "labels_loaded": labels_loaded,
            "num_labels": self.engine.labels().map(|l| l.len()).unwrap_or(0),
            "uptime_secs": (chrono::Utc::now() - self.started_at).num_seconds(),
            "version": env!("CARGO_PKG_VERSION"),
        })
    }
}
