//! Winkel Tripel map projection.
//!
//! Implements the forward transform, a Newton-Raphson inverse, and the
//! projection-space bounds used to fit and mask the map.

pub mod bounds;
pub mod winkel;

pub use bounds::{winkel_tripel_bounds, ProjectionSpaceBounds, WINKEL_TRIPEL_BOUNDS};
pub use winkel::{forward, inverse, InverseOptions, InverseResult, STANDARD_PARALLEL};
