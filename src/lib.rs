//! Plumage - bird image classification server
//!
//! This crate provides:
//! - Decoding, resizing and normalization of uploaded images
//! - ONNX model inference with label mapping
//! - An HTTP upload endpoint and a CLI
//!
//! # Modules
//!
//! - [`inference`] - Preprocessing, model runtime and label mapping
//! - [`server`] - HTTP server with the upload API
//! - [`cli`] - Command-line interface
//! - [`error`] - Crate error type

pub mod error;

pub mod inference;

pub mod server;
pub mod cli;

pub use error::{PlumageError, Result};
pub use inference::{InferenceConfig, InferenceEngine, LabelMap, Prediction};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
