//! Inference engine implementation
//!
//! Ties the preprocessor, the model and the label map together:
//! bytes in, label out. The engine is built once at startup and never
//! mutated afterwards, so it is shared across requests without locking.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::config::InferenceConfig;
use super::labels::LabelMap;
use super::model::{argmax, Classifier, OnnxClassifier};
use super::preprocess::ImagePreprocessor;
use crate::error::{PlumageError, Result};

/// Outcome of classifying one image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Mapped label, or the fallback label when the index is unmapped
    pub label: String,
    /// Arg-max class index
    pub index: usize,
    /// Score at `index`
    pub score: f32,
}

/// Image classification engine
pub struct InferenceEngine {
    config: InferenceConfig,
    preprocessor: ImagePreprocessor,
    model: Option<Arc<dyn Classifier>>,
    labels: Option<Arc<LabelMap>>,
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("config", &self.config)
            .field("model", &self.model.as_ref().map(|m| m.describe()))
            .field("num_labels", &self.labels.as_ref().map(|l| l.len()))
            .finish()
    }
}

impl InferenceEngine {
    /// Create an engine with neither model nor labels
    pub fn new(config: InferenceConfig) -> Self {
        Self {
            preprocessor: ImagePreprocessor::new(&config),
            config,
            model: None,
            labels: None,
        }
    }

    /// Attach a model
    pub fn with_model(mut self, model: Arc<dyn Classifier>) -> Self {
        self.model = Some(model);
        self
    }

    /// Attach a label map
    pub fn with_labels(mut self, labels: LabelMap) -> Self {
        self.labels = Some(Arc::new(labels));
        self
    }

    /// Load model and labels from disk, each independently.
    ///
    /// A resource that fails to load is logged and left unavailable; the
    /// engine is still returned so the server can come up and report the
    /// condition per request.
    pub fn load(config: InferenceConfig, model_path: &Path, labels_path: &Path) -> Self {
        let mut engine = Self::new(config);

        let start = Instant::now();
        match OnnxClassifier::load(model_path, engine.config.input_shape()) {
            Ok(model) => {
                info!(
                    path = %model_path.display(),
                    input_shape = ?model.input_shape(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Model loaded"
                );
                engine.model = Some(Arc::new(model));
            }
            Err(e) => error!(path = %model_path.display(), error = %e, "Error loading model"),
        }

        match LabelMap::load(labels_path) {
            Ok(labels) => {
                if labels.is_empty() {
                    warn!(path = %labels_path.display(), "Label file is empty; every prediction will be unmapped");
                } else {
                    info!(path = %labels_path.display(), num_labels = labels.len(), "Labels loaded");
                }
                engine.labels = Some(Arc::new(labels));
            }
            Err(e) => error!(path = %labels_path.display(), error = %e, "Error loading labels"),
        }

        engine
    }

    /// Both model and labels are available
    pub fn is_ready(&self) -> bool {
        self.model.is_some() && self.labels.is_some()
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn labels(&self) -> Option<&LabelMap> {
        self.labels.as_deref()
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Decode, resize, normalize, predict and map the label
    pub fn classify(&self, bytes: &[u8]) -> Result<Prediction> {
        let (model, labels) = match (&self.model, &self.labels) {
            (Some(model), Some(labels)) => (model, labels),
            _ => return Err(PlumageError::NotLoaded),
        };

        let start = Instant::now();
        let input = self.preprocessor.prepare(bytes)?;
        let scores = model.forward(input)?;
        let index = argmax(&scores).ok_or(PlumageError::EmptyScores)?;

        if scores.len() != labels.len() {
            debug!(
                num_scores = scores.len(),
                num_labels = labels.len(),
                "Score vector and label map differ in length"
            );
        }

        let label = labels
            .get(index)
            .unwrap_or(self.config.fallback_label.as_str())
            .to_string();

        debug!(
            label = %label,
            index,
            score = scores[index],
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image classified"
        );

        Ok(Prediction {
            label,
            index,
            score: scores[index],
        })
    }
}
