//! Pixel input and scalar fields.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

use crate::error::{ReliefError, Result};

/// Square RGBA sample buffer, `resolution² × 4` bytes, row-major, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    resolution: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(resolution: u32, data: Vec<u8>) -> Result<Self> {
        if resolution == 0 {
            return Err(ReliefError::ZeroResolution);
        }
        let expected = (resolution as usize).pow(2) * 4;
        if data.len() != expected {
            return Err(ReliefError::PixelBufferSize {
                resolution,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { resolution, data })
    }

    /// Fit `img` into a `resolution × resolution` square, preserving aspect ratio.
    ///
    /// Pixels outside the fitted image stay fully transparent, so they read as background.
    pub fn from_image(img: &DynamicImage, resolution: u32) -> Result<Self> {
        if resolution == 0 {
            return Err(ReliefError::ZeroResolution);
        }
        let fitted = img.resize(resolution, resolution, FilterType::Triangle).to_rgba8();
        let mut canvas = RgbaImage::new(resolution, resolution);
        let x = (resolution - fitted.width()) / 2;
        let y = (resolution - fitted.height()) / 2;
        image::imageops::overlay(&mut canvas, &fitted, i64::from(x), i64::from(y));
        Self::new(resolution, canvas.into_raw())
    }

    /// Opaque grayscale pixels carrying `value * 255` in every colour channel.
    pub fn from_field(field: &ScalarField) -> Result<Self> {
        let data = field
            .values()
            .iter()
            .flat_map(|&v| {
                let g = (v * 255.0).round() as u8;
                [g, g, g, 255]
            })
            .collect();
        Self::new(field.resolution() as u32, data)
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(4)
    }
}

/// Read and decode an image file.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    Ok(image::open(path)?)
}

/// Decode an in-memory encoded image (PNG, JPEG, ...).
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// Immutable `resolution × resolution` grid of values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    resolution: usize,
    values: Vec<f64>,
}

impl ScalarField {
    /// Build a field by sampling `f(x, y)` at every grid point. Values are clamped to `[0, 1]`.
    pub fn from_fn(resolution: usize, f: impl Fn(usize, usize) -> f64) -> Self {
        let mut values = Vec::with_capacity(resolution * resolution);
        for y in 0..resolution {
            for x in 0..resolution {
                values.push(clamp01(f(x, y)));
            }
        }
        Self { resolution, values }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Sample at column `x`, row `y` (row 0 is the top of the image).
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.values[y * self.resolution + x]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Luminance-times-alpha field with inversion and contrast applied (vector mode input).
pub fn build_scalar_field(pixels: &PixelBuffer, contrast: f64, invert: bool) -> ScalarField {
    let values = pixels
        .pixels()
        .map(|px| {
            let [r, g, b, a] = [px[0], px[1], px[2], px[3]].map(f64::from);
            let luminance = (0.299 * r + 0.587 * g + 0.114 * b) / 255.0;
            let mut value = luminance * (a / 255.0);
            if invert {
                value = 1.0 - value;
            }
            if contrast > 1.0 {
                value = clamp01((value - 0.5) * contrast + 0.5);
            }
            clamp01(value)
        })
        .collect();

    ScalarField {
        resolution: pixels.resolution() as usize,
        values,
    }
}

/// Plain channel-average field for the heightfield mode.
///
/// Alpha, contrast and threshold are deliberately not applied here.
pub fn relief_field(pixels: &PixelBuffer, invert: bool) -> ScalarField {
    let values = pixels
        .pixels()
        .map(|px| {
            let sum = u32::from(px[0]) + u32::from(px[1]) + u32::from(px[2]);
            let value = f64::from(sum) / (3.0 * 255.0);
            if invert {
                1.0 - value
            } else {
                value
            }
        })
        .collect();

    ScalarField {
        resolution: pixels.resolution() as usize,
        values,
    }
}

#[inline]
fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}
