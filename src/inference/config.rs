//! Inference configuration

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Resampling filter used when resizing uploads to the model resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeFilter {
    /// Nearest neighbour
    Nearest,
    /// Bilinear
    Triangle,
    /// Bicubic
    CatmullRom,
    /// Gaussian
    Gaussian,
    /// Lanczos with window 3
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Memory layout of the input tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TensorLayout {
    /// `[batch, height, width, channels]`, the Keras default
    Nhwc,
    /// `[batch, channels, height, width]`
    Nchw,
}

/// Configuration for image preprocessing and prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Width the upload is resized to
    pub input_width: u32,

    /// Height the upload is resized to
    pub input_height: u32,

    /// Input tensor layout expected by the model
    pub layout: TensorLayout,

    /// Resampling filter
    pub filter: ResizeFilter,

    /// Label returned when the predicted index has no mapping
    pub fallback_label: String,
}

/// Channels fed to the model; uploads are always converted to RGB.
pub const INPUT_CHANNELS: usize = 3;

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            input_width: 64,
            input_height: 64,
            layout: TensorLayout::Nhwc,
            filter: ResizeFilter::CatmullRom,
            fallback_label: "Unknown".to_string(),
        }
    }
}

impl InferenceConfig {
    /// Create a new inference configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the model input resolution
    pub fn with_input_size(mut self, width: u32, height: u32) -> Self {
        self.input_width = width;
        self.input_height = height;
        self
    }

    /// Builder method to set the tensor layout
    pub fn with_layout(mut self, layout: TensorLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Builder method to set the resize filter
    pub fn with_filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Builder method to set the label used for unmapped indices
    pub fn with_fallback_label(mut self, label: impl Into<String>) -> Self {
        self.fallback_label = label.into();
        self
    }

    /// Shape of the single-image batch fed to the model
    pub fn input_shape(&self) -> [usize; 4] {
        let (h, w) = (self.input_height as usize, self.input_width as usize);
        match self.layout {
            TensorLayout::Nhwc => [1, h, w, INPUT_CHANNELS],
            TensorLayout::Nchw => [1, INPUT_CHANNELS, h, w],
        }
    }
}
