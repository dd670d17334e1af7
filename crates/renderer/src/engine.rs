//! Immutable rendering handle.
//!
//! A [`ProjectionEngine`] is built once at startup from the configuration
//! and palette registry, then cloned into every render call or worker.

use std::sync::Arc;

use climate_common::{GriddedData, ProjectionPoint};
use projection::{forward, inverse, winkel_tripel_bounds, InverseResult, ProjectionSpaceBounds};

use crate::colormap::{sample_palette_hex, Palette, PaletteRegistry};
use crate::compositor::{render_composite, CompositeOptions, RenderedFrame};
use crate::config::RenderConfig;
use crate::error::{RenderError, RenderResult};
use crate::grid_texture::colorize_grid;
use crate::sampler::SampledRaster;
use crate::vectors::{project_vectors, ProjectedVectorSegments, VectorFeature};
use crate::view::ViewParams;

#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    bounds: ProjectionSpaceBounds,
    config: Arc<RenderConfig>,
    palettes: Arc<PaletteRegistry>,
}

impl ProjectionEngine {
    /// Validate `config` and capture the default Winkel Tripel bounds.
    pub fn new(config: RenderConfig, palettes: PaletteRegistry) -> RenderResult<Self> {
        config.validate().map_err(RenderError::Config)?;
        let bounds = winkel_tripel_bounds();
        tracing::info!(
            palettes = palettes.len(),
            x_max = bounds.x_max,
            y_max = bounds.y_max,
            "Projection engine initialized"
        );
        Ok(Self {
            bounds,
            config: Arc::new(config),
            palettes: Arc::new(palettes),
        })
    }

    /// Replace the projection bounds used for fitting and masking.
    pub fn with_bounds(mut self, bounds: ProjectionSpaceBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn bounds(&self) -> &ProjectionSpaceBounds {
        &self.bounds
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn palettes(&self) -> &PaletteRegistry {
        &self.palettes
    }

    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> ProjectionPoint {
        forward(lon_deg, lat_deg)
    }

    /// Inverse projection with the configured iteration cap and tolerance.
    pub fn inverse(&self, x: f64, y: f64) -> InverseResult {
        inverse(x, y, self.config.inverse_options())
    }

    pub fn render_composite(&self, options: &CompositeOptions) -> RenderResult<RenderedFrame> {
        render_composite(options, &self.bounds, &self.config)
    }

    pub fn project_vectors(
        &self,
        features: &[VectorFeature],
        canvas_width: usize,
        canvas_height: usize,
        view: &ViewParams,
    ) -> RenderResult<Vec<ProjectedVectorSegments>> {
        project_vectors(
            features,
            canvas_width,
            canvas_height,
            view,
            &self.bounds,
            &self.config,
        )
    }

    /// Palette by name, falling back to the first registered palette.
    pub fn palette(&self, name: &str) -> Option<&Palette> {
        self.palettes.get(name)
    }

    pub fn sample_palette_hex(&self, name: &str, count: usize) -> Vec<String> {
        self.palette(name)
            .map(|p| sample_palette_hex(p, count))
            .unwrap_or_default()
    }

    /// Colorize a grid with a registered palette.
    pub fn colorize(
        &self,
        grid: &GriddedData,
        palette_name: &str,
        opacity: f64,
    ) -> RenderResult<SampledRaster> {
        let palette = self.palette(palette_name).ok_or_else(|| {
            RenderError::Palette(format!("no palettes registered (requested '{}')", palette_name))
        })?;
        colorize_grid(grid, palette, opacity)
    }
}
