//! Error types for the rendering pipeline.

use thiserror::Error;

/// Result type alias using RenderError.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors raised by the renderer.
///
/// Pixels that cannot be inverse-projected and samples outside a raster are
/// not errors; they are simply left transparent.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The output surface could not be allocated (zero or overflowing size).
    #[error("Cannot acquire render surface: {0}")]
    Surface(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Invalid palette definition: {0}")]
    Palette(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("PNG encoding failed: {0}")]
    Png(String),

    #[error("Invalid input data: {0}")]
    Data(#[from] climate_common::ClimateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
