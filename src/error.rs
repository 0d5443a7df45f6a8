//! Error types for the plumage inference server

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for plumage operations
pub type Result<T> = std::result::Result<T, PlumageError>;

/// Main error type for loading and running the classifier
#[derive(Error, Debug)]
pub enum PlumageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid label file {path}: {reason}")]
    LabelError { path: PathBuf, reason: String },

    /// Decoder messages are surfaced to the client as-is.
    #[error(transparent)]
    DecodeError(#[from] image::ImageError),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Failed to load model from {path}: {reason}")]
    ModelLoadError { path: PathBuf, reason: String },

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Model returned no class scores")]
    EmptyScores,

    #[error("Model or labels not loaded")]
    NotLoaded,
}

impl PlumageError {
    pub(crate) fn labels(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PlumageError::LabelError {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
