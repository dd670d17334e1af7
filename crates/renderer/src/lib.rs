//! Winkel Tripel rendering for global climate data.
//!
//! - Colormaps built from declarative palette definitions
//! - Bilinear raster sampling and grid colorization
//! - Per-pixel compositing with footprint masking and "over" blending
//! - Vector projection with dateline and pole splitting
//! - Progressive multi-pass rendering and a single-frame render cache

pub mod cache;
pub mod color;
pub mod colormap;
pub mod compositor;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid_texture;
pub mod png;
pub mod progressive;
pub mod sampler;
pub mod vectors;
pub mod view;

pub use cache::{CacheStats, RenderCache, RenderCacheKey};
pub use color::Color;
pub use colormap::{sample_palette_hex, ColorStop, Palette, PaletteDefinition, PaletteRegistry};
pub use compositor::{blend_over, render_composite, CompositeOptions, RenderedFrame};
pub use config::RenderConfig;
pub use engine::ProjectionEngine;
pub use error::{RenderError, RenderResult};
pub use grid_texture::colorize_grid;
pub use progressive::{
    CancelToken, InlineScheduler, PassScheduler, ProgressiveRenderer, RenderPass,
    StaggeredScheduler,
};
pub use sampler::{bilinear_sample, sample_equirectangular, sample_raster, SampleableImage, SampledRaster};
pub use vectors::{project_vectors, ProjectedVectorSegments, ScreenPoint, VectorFeature};
pub use view::{ViewParams, ViewTransform};
