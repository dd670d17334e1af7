//! Shared test utilities for the winkel-render workspace.
//!
//! - Synthetic gridded data and image generators
//! - Palette and vector fixtures
//! - Tolerance assertions for projected and geographic values
//!
//! Add as a dev-dependency with `test-utils = { path = "../test-utils" }`.

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;

/// Assert two numbers agree within `tolerance`. NaN on either side fails.
///
/// An optional trailing format string adds context to the failure.
///
/// ```ignore
/// assert_approx_eq!(result.error, 0.0, 1e-10);
/// assert_approx_eq!(px, 200.0, 1e-9, "pixel x at lon {}", lon);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($actual:expr, $expected:expr, $tolerance:expr $(,)?) => {
        $crate::assert_approx_eq!($actual, $expected, $tolerance, "values differ")
    };
    ($actual:expr, $expected:expr, $tolerance:expr, $($context:tt)+) => {{
        let (actual, expected, tolerance) = ($actual as f64, $expected as f64, $tolerance as f64);
        let within = (actual - expected).abs() <= tolerance;
        assert!(
            within,
            "{}: got {}, expected {} (tolerance {})",
            format_args!($($context)+),
            actual,
            expected,
            tolerance
        );
    }};
}

/// Assert a value with `lon`/`lat` fields sits at `(lon, lat)` within `tolerance` degrees.
///
/// ```ignore
/// assert_geo_approx_eq!(result.point, (10.0, -20.0), 1e-6);
/// ```
#[macro_export]
macro_rules! assert_geo_approx_eq {
    ($point:expr, ($lon:expr, $lat:expr), $tolerance:expr $(,)?) => {{
        let point = $point;
        let (lon, lat) = ($lon as f64, $lat as f64);
        $crate::assert_approx_eq!(point.lon, lon, $tolerance, "longitude of ({}, {})", lon, lat);
        $crate::assert_approx_eq!(point.lat, lat, $tolerance, "latitude of ({}, {})", lon, lat);
    }};
}
