//! Inference module
//!
//! Provides single-image classification with:
//! - Decoding of any format the `image` crate supports
//! - Fixed-resolution resize and `[0, 1]` normalization
//! - ONNX forward pass via `tract`
//! - Arg-max to label mapping with an "Unknown" fallback

mod config;
mod engine;
mod labels;
mod model;
mod preprocess;

pub use config::{InferenceConfig, ResizeFilter, TensorLayout, INPUT_CHANNELS};
pub use engine::{InferenceEngine, Prediction};
pub use labels::LabelMap;
pub use model::{argmax, Classifier, OnnxClassifier};
pub use preprocess::{normalize_channel, ImagePreprocessor, ImageTensor};
