//! Class label mapping
//!
//! The label file on disk maps label names to class indices
//! (`{"CROW": 3, ...}`). It is inverted once at load time so that a
//! predicted index can be turned back into a name.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{PlumageError, Result};

/// Immutable index → label lookup
#[derive(Debug, Clone, Default)]
pub struct LabelMap {
    by_index: HashMap<usize, String>,
}

impl LabelMap {
    /// Read and invert a label file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents, path)
    }

    /// Invert a `{"label": index}` JSON document.
    ///
    /// Indices must be non-negative whole numbers (`3` or `3.0`). When two
    /// labels share an index, the one later in the file wins.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::parse(json, Path::new("<inline>"))
    }

    fn parse(json: &str, origin: &Path) -> Result<Self> {
        // Map keeps file order (serde_json `preserve_order`)
        let raw: Map<String, Value> = serde_json::from_str(json)?;

        let mut by_index = HashMap::with_capacity(raw.len());
        for (label, value) in raw {
            let index = class_index(&value).ok_or_else(|| {
                PlumageError::labels(
                    origin,
                    format!("index for '{}' must be a non-negative integer, got {}", label, value),
                )
            })?;

            if let Some(previous) = by_index.insert(index, label.clone()) {
                warn!(
                    path = %origin.display(),
                    index,
                    replaced = %previous,
                    label = %label,
                    "Duplicate class index in label file; keeping the later label"
                );
            }
        }

        Ok(Self { by_index })
    }

    /// Build directly from `(index, label)` pairs
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (usize, S)>,
        S: Into<String>,
    {
        Self {
            by_index: pairs.into_iter().map(|(i, s)| (i, s.into())).collect(),
        }
    }

    /// Label for a class index, if one is mapped
    pub fn get(&self, index: usize) -> Option<&str> {
        self.by_index.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    /// All `(index, label)` pairs ordered by index
    pub fn entries(&self) -> Vec<(usize, &str)> {
        let mut entries: Vec<(usize, &str)> = self
            .by_index
            .iter()
            .map(|(i, s)| (*i, s.as_str()))
            .collect();
        entries.sort_unstable_by_key(|(i, _)| *i);
        entries
    }
}

/// Integer index, also accepting whole floats such as `2.0`
fn class_index(value: &Value) -> Option<usize> {
    if let Some(i) = value.as_u64() {
        return usize::try_from(i).ok();
    }
    let f = value.as_f64()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= usize::MAX as f64 {
        Some(f as usize)
    } else {
        None
    }
}
