//! Per-pixel compositing of raster layers onto the Winkel Tripel canvas.
//!
//! For each output pixel:
//! 1. map the pixel center to the projection plane through the view transform
//! 2. reject it if it falls outside the elliptical map footprint
//! 3. inverse-project it to geography, rejecting unresolved points
//! 4. sample the base layer, then every overlay, blending with "over"
//!
//! Rejected pixels stay fully transparent. Every call allocates and returns
//! its own frame.

use std::sync::Arc;
use std::time::Instant;

use projection::{inverse, InverseOptions, ProjectionSpaceBounds};
use rayon::prelude::*;

use crate::color::Color;
use crate::config::RenderConfig;
use crate::error::{RenderError, RenderResult};
use crate::sampler::{sample_raster, SampleableImage, SampledRaster};
use crate::view::{ViewParams, ViewTransform};

/// Everything one composite pass needs besides the engine configuration.
#[derive(Debug, Clone)]
pub struct CompositeOptions {
    /// Canvas size in display pixels.
    pub width: usize,
    pub height: usize,
    /// Integer downsample factor; the frame is `ceil(width / downsample)` wide.
    pub downsample: usize,
    pub view: ViewParams,
    /// Full-world equirectangular base image.
    pub base: Option<Arc<SampleableImage>>,
    /// Overlays, blended in order over the base.
    pub overlays: Vec<SampledRaster>,
    /// Overrides the default projection bounds for this call.
    pub bounds: Option<ProjectionSpaceBounds>,
}

impl CompositeOptions {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            downsample: 1,
            view: ViewParams::default(),
            base: None,
            overlays: Vec::new(),
            bounds: None,
        }
    }

    pub fn with_downsample(mut self, downsample: usize) -> Self {
        self.downsample = downsample;
        self
    }

    pub fn with_view(mut self, view: ViewParams) -> Self {
        self.view = view;
        self
    }

    pub fn with_base(mut self, base: impl Into<Arc<SampleableImage>>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn with_overlay(mut self, overlay: SampledRaster) -> Self {
        self.overlays.push(overlay);
        self
    }

    pub fn with_bounds(mut self, bounds: ProjectionSpaceBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

/// A composited RGBA frame at reduced resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFrame {
    pub width: usize,
    pub height: usize,
    pub downsample: usize,
    pub pixels: Vec<u8>,
}

impl RenderedFrame {
    /// Allocate a transparent frame, failing on zero or overflowing sizes.
    pub fn allocate(width: usize, height: usize, downsample: usize) -> RenderResult<Self> {
        let len = surface_len(width, height, downsample)?;
        Ok(Self {
            width,
            height,
            downsample,
            pixels: vec![0; len],
        })
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        Some(Color::from_slice(&self.pixels[idx..idx + 4]))
    }

    /// Number of pixels with non-zero alpha.
    pub fn drawn_pixels(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| px[3] > 0).count()
    }
}

/// Byte length of an RGBA surface, or a `Surface` error if it cannot exist.
pub fn surface_len(width: usize, height: usize, downsample: usize) -> RenderResult<usize> {
    if width == 0 || height == 0 {
        return Err(RenderError::Surface(format!(
            "frame must be non-empty, got {}x{}",
            width, height
        )));
    }
    if downsample == 0 {
        return Err(RenderError::Surface("downsample must be >= 1".to_string()));
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(4))
        .filter(|&n| n <= isize::MAX as usize)
        .ok_or_else(|| RenderError::Surface(format!("{}x{} frame overflows", width, height)))
}

/// Frame size for a canvas at a downsample factor.
pub fn frame_size(width: usize, height: usize, downsample: usize) -> (usize, usize) {
    let ds = downsample.max(1);
    (width.div_ceil(ds), height.div_ceil(ds))
}

/// Accumulated color with straight (non-premultiplied) channels in 0-255
/// and alpha in 0-1.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlendColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl BlendColor {
    pub fn from_color(color: Color) -> Self {
        Self {
            r: color.r as f64,
            g: color.g as f64,
            b: color.b as f64,
            a: color.a as f64 / 255.0,
        }
    }

    pub fn to_color(self) -> Color {
        let byte = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        Color::new(byte(self.r), byte(self.g), byte(self.b), byte(self.a * 255.0))
    }
}

/// Porter-Duff "over": `overlay` (its alpha scaled by `opacity`) on top of `base`.
///
/// A fully transparent contribution leaves `base` unchanged.
pub fn blend_over(base: BlendColor, overlay: Color, opacity: f64) -> BlendColor {
    let a_over = overlay.a as f64 / 255.0 * opacity;
    if a_over.is_nan() || a_over <= 0.0 {
        return base;
    }
    let keep = base.a * (1.0 - a_over);
    let out_a = a_over + keep;
    if out_a <= 0.0 {
        return BlendColor::default();
    }
    let mix = |over: u8, under: f64| (over as f64 * a_over + under * keep) / out_a;
    BlendColor {
        r: mix(overlay.r, base.r),
        g: mix(overlay.g, base.g),
        b: mix(overlay.b, base.b),
        a: out_a,
    }
}

/// Per-row pixel accounting, merged across rows for the render summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CompositeStats {
    drawn: usize,
    outside_footprint: usize,
    unresolved: usize,
}

impl CompositeStats {
    fn merge(self, other: Self) -> Self {
        Self {
            drawn: self.drawn + other.drawn,
            outside_footprint: self.outside_footprint + other.outside_footprint,
            unresolved: self.unresolved + other.unresolved,
        }
    }
}

struct RowContext<'a> {
    transform: ViewTransform,
    bounds: &'a ProjectionSpaceBounds,
    layers: &'a [SampledRaster],
    downsample: f64,
    slack: f64,
    inverse_options: InverseOptions,
    accept_error: f64,
}

impl RowContext<'_> {
    fn render_row(&self, row: usize, out: &mut [u8]) -> CompositeStats {
        let mut stats = CompositeStats::default();
        let py = (row as f64 + 0.5) * self.downsample;

        for (col, px_out) in out.chunks_exact_mut(4).enumerate() {
            let px = (col as f64 + 0.5) * self.downsample;
            let point = self.transform.pixel_to_projection(px, py);

            if !self.bounds.within_footprint(point, self.slack) {
                stats.outside_footprint += 1;
                continue;
            }

            let result = inverse(point.x, point.y, self.inverse_options);
            if !result.is_acceptable(self.accept_error) {
                stats.unresolved += 1;
                continue;
            }

            let color = self
                .layers
                .iter()
                .fold(BlendColor::default(), |acc, layer| {
                    match sample_raster(layer, result.point) {
                        Some(sample) => blend_over(acc, sample, layer.opacity),
                        None => acc,
                    }
                })
                .to_color();

            if color.a > 0 {
                px_out.copy_from_slice(&color.to_array());
                stats.drawn += 1;
            }
        }

        stats
    }
}

/// Composite the base layer and overlays into a new frame.
pub fn render_composite(
    options: &CompositeOptions,
    bounds: &ProjectionSpaceBounds,
    config: &RenderConfig,
) -> RenderResult<RenderedFrame> {
    options.view.validate()?;
    let (out_width, out_height) = frame_size(options.width, options.height, options.downsample);
    let mut frame = RenderedFrame::allocate(out_width, out_height, options.downsample)?;

    let start = Instant::now();
    let bounds = options.bounds.as_ref().unwrap_or(bounds);
    let transform = ViewTransform::new(
        options.width as f64,
        options.height as f64,
        bounds,
        &options.view,
    );

    let mut layers = Vec::with_capacity(options.overlays.len() + 1);
    if let Some(base) = &options.base {
        layers.push(SampledRaster::world(Arc::clone(base)));
    }
    layers.extend(options.overlays.iter().filter(|o| o.is_usable()).cloned());

    let ctx = RowContext {
        transform,
        bounds,
        layers: &layers,
        downsample: options.downsample as f64,
        slack: config.composite_footprint_slack,
        inverse_options: config.inverse_options(),
        accept_error: config.inverse_accept_error,
    };

    let row_bytes = out_width * 4;
    let stats = if config.parallel_rows {
        frame
            .pixels
            .par_chunks_mut(row_bytes)
            .enumerate()
            .map(|(row, out)| ctx.render_row(row, out))
            .reduce(CompositeStats::default, CompositeStats::merge)
    } else {
        frame
            .pixels
            .chunks_mut(row_bytes)
            .enumerate()
            .map(|(row, out)| ctx.render_row(row, out))
            .fold(CompositeStats::default(), CompositeStats::merge)
    };

    tracing::debug!(
        width = out_width,
        height = out_height,
        downsample = options.downsample,
        layers = layers.len(),
        drawn = stats.drawn,
        outside_footprint = stats.outside_footprint,
        unresolved = stats.unresolved,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Composite rendered"
    );

    Ok(frame)
}
