//! Integration test: preprocessing, label loading and the bird model

use plumage::error::{PlumageError, Result};
use plumage::inference::{
    Classifier, ImagePreprocessor, ImageTensor, InferenceConfig, InferenceEngine, LabelMap,
    OnnxClassifier, TensorLayout,
};
use plumage::server::{DEFAULT_LABELS_PATH, DEFAULT_MODEL_PATH};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

fn checkerboard(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        if (x / 4 + y / 4) % 2 == 0 { Rgb([255, 255, 255]) } else { Rgb([0, 0, 0]) }
    }))
}

/// Two classes: dark (0) and bright (1).
struct Brightness;

impl Classifier for Brightness {
    fn forward(&self, input: ImageTensor) -> Result<Vec<f32>> {
        let mean = input.mean().unwrap_or(0.0);
        Ok(vec![1.0 - mean, mean])
    }
}

// ============================================================================
// Preprocessing
// ============================================================================

#[test]
fn test_common_formats_decode_to_model_shape() {
    let pre = ImagePreprocessor::new(&InferenceConfig::default());
    let img = checkerboard(120, 90);

    for format in [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Bmp] {
        let tensor = pre.prepare(&encode(&img, format)).unwrap();
        assert_eq!(tensor.shape(), &[1, 64, 64, 3], "format {:?}", format);
        assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));
    }
}

#[test]
fn test_grayscale_is_expanded_to_rgb() {
    let pre = ImagePreprocessor::new(&InferenceConfig::default());
    let gray = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(40, 40, image::Luma([255])));
    let tensor = pre.prepare(&encode(&gray, ImageFormat::Png)).unwrap();
    assert_eq!(tensor.shape(), &[1, 64, 64, 3]);
    assert!(tensor.iter().all(|v| *v == 1.0));
}

#[test]
fn test_same_bytes_same_tensor() {
    let pre = ImagePreprocessor::new(&InferenceConfig::default());
    let bytes = encode(&checkerboard(333, 111), ImageFormat::Png);
    assert_eq!(pre.prepare(&bytes).unwrap(), pre.prepare(&bytes).unwrap());
}

// ============================================================================
// Engine
// ============================================================================

#[test]
fn test_engine_loads_labels_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let labels_path = dir.path().join("labels.json");
    std::fs::write(&labels_path, r#"{"NIGHTJAR": 0, "SNOWY OWL": 1}"#).unwrap();

    let labels = LabelMap::load(&labels_path).unwrap();
    let engine = InferenceEngine::new(InferenceConfig::default())
        .with_model(Arc::new(Brightness))
        .with_labels(labels);

    let white = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 50, Rgb([250, 250, 250])));
    let black = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 50, Rgb([5, 5, 5])));

    assert_eq!(engine.classify(&encode(&white, ImageFormat::Png)).unwrap().label, "SNOWY OWL");
    assert_eq!(engine.classify(&encode(&black, ImageFormat::Png)).unwrap().label, "NIGHTJAR");
}

#[test]
fn test_malformed_labels_leave_engine_unready() {
    let dir = tempfile::tempdir().unwrap();
    let labels_path = dir.path().join("labels.json");
    std::fs::write(&labels_path, "{ not json").unwrap();

    let engine = InferenceEngine::load(
        InferenceConfig::default(),
        &dir.path().join("model.onnx"),
        &labels_path,
    );
    assert!(engine.labels().is_none());
    assert!(!engine.is_ready());
}

// ============================================================================
// End-to-end with a small ONNX graph
// ============================================================================

/// Channel means times a fixed `[3, 4]` matrix: red, green, blue, then
/// `0.4 * (r + g + b)` for the fourth class.
const TINY_MODEL: &str = "tests/fixtures/tiny_classifier.onnx";

fn tiny_engine(dir: &Path) -> InferenceEngine {
    let labels_path = dir.join("labels.json");
    std::fs::write(
        &labels_path,
        r#"{"CARDINAL": 0, "GREEN JAY": 1, "BLUE JAY": 2, "SNOWY OWL": 3}"#,
    )
    .unwrap();
    InferenceEngine::load(InferenceConfig::default(), Path::new(TINY_MODEL), &labels_path)
}

fn solid_png(color: [u8; 3]) -> Vec<u8> {
    encode(&DynamicImage::ImageRgb8(RgbImage::from_pixel(90, 70, Rgb(color))), ImageFormat::Png)
}

#[test]
fn test_onnx_engine_classifies_uploads() {
    let dir = tempfile::tempdir().unwrap();
    let engine = tiny_engine(dir.path());
    assert!(engine.is_ready());

    let red = engine.classify(&solid_png([255, 0, 0])).unwrap();
    assert_eq!(red.label, "CARDINAL");
    assert_eq!(red.index, 0);
    assert!((red.score - 1.0).abs() < 1e-3);

    assert_eq!(engine.classify(&solid_png([10, 200, 30])).unwrap().label, "GREEN JAY");
    assert_eq!(engine.classify(&solid_png([0, 40, 220])).unwrap().label, "BLUE JAY");
    assert_eq!(engine.classify(&solid_png([240, 240, 240])).unwrap().label, "SNOWY OWL");
}

#[test]
fn test_onnx_engine_rejects_mismatched_layout() {
    let dir = tempfile::tempdir().unwrap();
    let labels_path = dir.path().join("labels.json");
    std::fs::write(&labels_path, r#"{"CARDINAL": 0}"#).unwrap();

    // model optimized for NHWC, engine configured to feed NCHW
    let config = InferenceConfig::default().with_layout(TensorLayout::Nchw);
    let engine = InferenceEngine::new(config)
        .with_model(Arc::new(OnnxClassifier::load(TINY_MODEL, [1, 64, 64, 3]).unwrap()))
        .with_labels(LabelMap::load(&labels_path).unwrap());

    let err = engine.classify(&solid_png([255, 0, 0])).unwrap_err();
    assert!(matches!(err, PlumageError::ShapeError { .. }), "{:?}", err);
}

// ============================================================================
// End-to-end with the trained bird model
// ============================================================================

/// Runs only when the trained artifacts and a sample image are present:
/// `Model/BirdsModel.onnx`, `Data/labels.json`, and
/// `tests/fixtures/sample_bird.png` with its species in
/// `tests/fixtures/sample_bird.txt`.
#[test]
fn test_bird_model_end_to_end() {
    let model = Path::new(DEFAULT_MODEL_PATH);
    let labels = Path::new(DEFAULT_LABELS_PATH);
    let sample = Path::new("tests/fixtures/sample_bird.png");
    let expected = Path::new("tests/fixtures/sample_bird.txt");

    if ![model, labels, sample, expected].iter().all(|p| p.exists()) {
        eprintln!("skipping: bird model fixtures not present");
        return;
    }

    let engine = InferenceEngine::load(InferenceConfig::default(), model, labels);
    assert!(engine.is_ready());

    let bytes = std::fs::read(sample).unwrap();
    let expected = std::fs::read_to_string(expected).unwrap();
    let prediction = engine.classify(&bytes).unwrap();
    assert_eq!(prediction.label, expected.trim());
}
