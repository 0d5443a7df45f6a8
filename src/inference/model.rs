//! Model runtime
//!
//! [`Classifier`] is the seam between the HTTP layer and whatever produces
//! class scores. The production implementation runs an ONNX graph through
//! `tract`; tests plug in deterministic stand-ins.

use std::path::{Path, PathBuf};

use tract_onnx::prelude::*;

use super::preprocess::ImageTensor;
use crate::error::{PlumageError, Result};

/// Produces one score per class for a single-image batch
pub trait Classifier: Send + Sync {
    /// Run one forward pass
    fn forward(&self, input: ImageTensor) -> Result<Vec<f32>>;

    /// Human-readable description for logs
    fn describe(&self) -> String {
        "classifier".to_string()
    }
}

type OnnxPlan = TypedRunnableModel<TypedModel>;

/// ONNX classifier optimized for a fixed input shape
pub struct OnnxClassifier {
    plan: OnnxPlan,
    path: PathBuf,
    input_shape: [usize; 4],
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("path", &self.path)
            .field("input_shape", &self.input_shape)
            .finish()
    }
}

impl OnnxClassifier {
    /// Load, type-check and optimize the graph at `path`
    pub fn load(path: impl AsRef<Path>, input_shape: [usize; 4]) -> Result<Self> {
        let path = path.as_ref();
        let load_err = |e: TractError| PlumageError::ModelLoadError {
            path: path.to_path_buf(),
            reason: format!("{:#}", e),
        };

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(load_err)?
            .with_input_fact(0, f32::fact(input_shape).into())
            .map_err(load_err)?
            .into_optimized()
            .map_err(load_err)?
            .into_runnable()
            .map_err(load_err)?;

        Ok(Self {
            plan,
            path: path.to_path_buf(),
            input_shape,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn input_shape(&self) -> [usize; 4] {
        self.input_shape
    }
}

impl Classifier for OnnxClassifier {
    fn forward(&self, input: ImageTensor) -> Result<Vec<f32>> {
        if input.shape() != &self.input_shape[..] {
            return Err(PlumageError::ShapeError {
                expected: format!("{:?}", self.input_shape),
                actual: format!("{:?}", input.shape()),
            });
        }

        let tensor: Tensor = input.into();
        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| PlumageError::InferenceError(format!("{:#}", e)))?;

        let first = outputs
            .first()
            .ok_or_else(|| PlumageError::InferenceError("model produced no outputs".to_string()))?;
        let scores = first
            .to_array_view::<f32>()
            .map_err(|e| PlumageError::InferenceError(format!("{:#}", e)))?;

        // Single-image batch: the scores of interest are the first (only) row.
        Ok(scores.iter().copied().collect())
    }

    fn describe(&self) -> String {
        format!("onnx:{} {:?}", self.path.display(), self.input_shape)
    }
}

/// Index of the largest score, first occurrence on ties.
///
/// A NaN compares above every number, so the first NaN wins.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            return Some(i);
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}
