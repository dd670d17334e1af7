//! Error types for climate data handling.

use thiserror::Error;

/// Result type alias using ClimateError.
pub type ClimateResult<T> = Result<T, ClimateError>;

/// Errors raised while loading or validating input data.
///
/// Numeric operations (projection, sampling) never produce these; they clamp
/// or report "no sample" instead.
#[derive(Debug, Error)]
pub enum ClimateError {
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid rectangle: {0}")]
    InvalidRectangle(String),

    #[error("Failed to read data: {0}")]
    DataReadError(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<std::io::Error> for ClimateError {
    fn from(err: std::io::Error) -> Self {
        ClimateError::DataReadError(err.to_string())
    }
}
