//! Bilinear raster sampling in pixel and geographic space.

use std::sync::Arc;

use climate_common::{GeoPoint, GeoRectangle};

use crate::color::Color;
use crate::error::{RenderError, RenderResult};

/// An RGBA8 image that can be sampled.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleableImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl SampleableImage {
    /// Wrap an RGBA buffer of exactly `width * height * 4` bytes.
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidImage(format!(
                "image must be non-empty, got {}x{}",
                width, height
            )));
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| RenderError::InvalidImage("image size overflows".to_string()))?;
        if pixels.len() != expected {
            return Err(RenderError::InvalidImage(format!(
                "expected {} bytes for {}x{} RGBA, got {}",
                expected,
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// An image filled with a single color.
    pub fn filled(width: usize, height: usize, color: Color) -> RenderResult<Self> {
        let count = width.checked_mul(height).unwrap_or(0);
        let pixels = color.to_array().repeat(count);
        Self::new(width, height, pixels)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel at integer coordinates, clamped to the image.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Color {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let idx = (y * self.width + x) * 4;
        Color::from_slice(&self.pixels[idx..idx + 4])
    }
}

/// A georeferenced texture layer.
#[derive(Debug, Clone)]
pub struct SampledRaster {
    pub texture: Arc<SampleableImage>,
    pub rectangle: GeoRectangle,
    /// Layer opacity in [0, 1].
    pub opacity: f64,
}

impl SampledRaster {
    pub fn new(texture: impl Into<Arc<SampleableImage>>, rectangle: GeoRectangle, opacity: f64) -> Self {
        let opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
        Self {
            texture: texture.into(),
            rectangle,
            opacity,
        }
    }

    /// A texture covering the whole globe at full opacity.
    pub fn world(texture: impl Into<Arc<SampleableImage>>) -> Self {
        Self::new(texture, GeoRectangle::WORLD, 1.0)
    }

    /// False when the rectangle is degenerate; such rasters never yield samples.
    pub fn is_usable(&self) -> bool {
        self.rectangle.is_valid()
    }
}

/// Four-neighbor interpolation at fractional pixel coordinates.
///
/// Coordinates are clamped into `[0, width-1] x [0, height-1]`; integer
/// coordinates return the source pixel unchanged. Color channels are
/// weighted by alpha, so transparent neighbors (masked cells) fade the
/// result out without darkening it.
pub fn bilinear_sample(image: &SampleableImage, x: f64, y: f64) -> Color {
    let max_x = (image.width - 1) as f64;
    let max_y = (image.height - 1) as f64;
    let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, max_x) };
    let y = if y.is_nan() { 0.0 } else { y.clamp(0.0, max_y) };

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(image.width - 1);
    let y1 = (y0 + 1).min(image.height - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let taps = [
        (image.pixel(x0, y0), (1.0 - fx) * (1.0 - fy)),
        (image.pixel(x1, y0), fx * (1.0 - fy)),
        (image.pixel(x0, y1), (1.0 - fx) * fy),
        (image.pixel(x1, y1), fx * fy),
    ];

    let mut alpha = 0.0;
    let mut premultiplied = [0.0f64; 3];
    let mut straight = [0.0f64; 3];
    for (color, weight) in taps {
        let weighted_alpha = color.a as f64 * weight;
        alpha += weighted_alpha;
        for (ch, value) in [color.r, color.g, color.b].into_iter().enumerate() {
            premultiplied[ch] += value as f64 * weighted_alpha;
            straight[ch] += value as f64 * weight;
        }
    }

    // Fully transparent neighborhoods keep their straight color.
    let rgb = if alpha > 0.0 {
        premultiplied.map(|v| v / alpha)
    } else {
        straight
    };
    let byte = |v: f64| v.round().clamp(0.0, 255.0) as u8;

    Color::new(byte(rgb[0]), byte(rgb[1]), byte(rgb[2]), byte(alpha))
}

/// Sample a full-world equirectangular image at a geographic point.
pub fn sample_equirectangular(image: &SampleableImage, point: GeoPoint) -> Color {
    let point = point.clamped();
    let u = (point.lon + 180.0) / 360.0;
    let v = (90.0 - point.lat) / 180.0;
    bilinear_sample(
        image,
        u * (image.width - 1) as f64,
        v * (image.height - 1) as f64,
    )
}

/// Sample a georeferenced raster.
///
/// Returns `None` for points outside the rectangle or when the rectangle is
/// degenerate.
pub fn sample_raster(raster: &SampledRaster, point: GeoPoint) -> Option<Color> {
    if !raster.is_usable() || !point.is_finite() || !raster.rectangle.contains(point) {
        return None;
    }
    let (u, v) = raster.rectangle.to_local(point);
    let texture = &raster.texture;
    Some(bilinear_sample(
        texture,
        u * (texture.width - 1) as f64,
        v * (texture.height - 1) as f64,
    ))
}
