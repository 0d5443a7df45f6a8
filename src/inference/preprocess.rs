//! Image decoding and tensor preparation

use image::{DynamicImage, GenericImageView};
use tract_onnx::prelude::tract_ndarray::Array4;

use super::config::{InferenceConfig, ResizeFilter, TensorLayout};
use crate::error::{PlumageError, Result};

/// Single-image batch fed to the classifier
pub type ImageTensor = Array4<f32>;

/// Scale an 8-bit channel value into `[0.0, 1.0]`
#[inline]
pub fn normalize_channel(value: u8) -> f32 {
    f32::from(value) / 255.0
}

/// Turns raw upload bytes into a normalized model input
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    width: u32,
    height: u32,
    layout: TensorLayout,
    filter: ResizeFilter,
}

impl ImagePreprocessor {
    pub fn new(config: &InferenceConfig) -> Self {
        Self {
            width: config.input_width,
            height: config.input_height,
            layout: config.layout,
            filter: config.filter,
        }
    }

    /// Decode bytes in any format the `image` crate recognises
    pub fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        let img = image::load_from_memory(bytes)?;
        let (w, h) = img.dimensions();
        if w == 0 || h == 0 {
            return Err(PlumageError::ShapeError {
                expected: "non-empty image".to_string(),
                actual: format!("{}x{}", w, h),
            });
        }
        Ok(img)
    }

    /// Resize to the model resolution, drop to RGB and scale into `[0, 1]`
    pub fn to_tensor(&self, img: &DynamicImage) -> ImageTensor {
        let rgb = img
            .resize_exact(self.width, self.height, self.filter.into())
            .to_rgb8();
        let (h, w) = (self.height as usize, self.width as usize);

        match self.layout {
            TensorLayout::Nhwc => Array4::from_shape_fn((1, h, w, 3), |(_, y, x, c)| {
                normalize_channel(rgb.get_pixel(x as u32, y as u32)[c])
            }),
            TensorLayout::Nchw => Array4::from_shape_fn((1, 3, h, w), |(_, c, y, x)| {
                normalize_channel(rgb.get_pixel(x as u32, y as u32)[c])
            }),
        }
    }

    /// Decode and convert in one step
    pub fn prepare(&self, bytes: &[u8]) -> Result<ImageTensor> {
        let img = self.decode(bytes)?;
        Ok(self.to_tensor(&img))
    }
}
