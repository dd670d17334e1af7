//! Common types shared across the climate map rendering crates.

pub mod error;
pub mod geo;
pub mod grid;

pub use error::{ClimateError, ClimateResult};
pub use geo::{GeoPoint, GeoRectangle, ProjectionPoint};
pub use grid::GriddedData;
