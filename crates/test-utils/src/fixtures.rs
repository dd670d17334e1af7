//! Common test fixtures.
//!
//! Pre-defined inputs for the scenarios the renderer tests keep coming back
//! to: a small palette file, the 2x2 reference grid and a few vector lines.

use climate_common::GriddedData;

/// Palette definitions in the on-disk JSON format.
///
/// Contains six valid palettes and one with an unknown build function.
pub const PALETTES_JSON: &str = r##"[
  {
    "FullName": "Temperature",
    "BuildFunction": "HEX",
    "Values": ["#313695", "#4575b4", "#abd9e9", "#fee090", "#f46d43", "#a50026"]
  },
  {
    "FullName": "Greys",
    "BuildFunction": "HEX",
    "Values": ["#000000", "#ffffff"]
  },
  {
    "FullName": "Precipitation",
    "BuildFunction": "xorgb",
    "Values": [
      {"x": 0.0, "o": 0.0, "r": 1.0, "g": 1.0, "b": 1.0},
      {"x": 0.2, "r": 0.6, "g": 0.8, "b": 1.0},
      {"x": 1.0, "r": 0.0, "g": 0.0, "b": 0.5}
    ]
  },
  {
    "FullName": "Unsorted",
    "BuildFunction": "xorgb",
    "Values": [
      {"x": 1.0, "r": 1.0, "g": 0.0, "b": 0.0},
      {"x": 0.0, "r": 0.0, "g": 0.0, "b": 1.0}
    ]
  },
  {
    "FullName": "Partly Broken",
    "BuildFunction": "HEX",
    "Values": ["#ff0000", "not-a-color", "#0000ff"]
  },
  {
    "FullName": "Single",
    "BuildFunction": "HEX",
    "Values": ["#123456"]
  },
  {
    "FullName": "Spline",
    "BuildFunction": "spline",
    "Values": []
  }
]"##;

/// Number of palettes in [`PALETTES_JSON`] that build successfully.
pub const VALID_PALETTE_COUNT: usize = 6;

/// The 2x2 reference grid: `lat=[-10,10]`, `lon=[-10,10]`, `values=[1,2,3,4]`.
///
/// Value 1 sits at (lon -10, lat -10) and value 4 at (lon 10, lat 10).
pub fn reference_grid() -> GriddedData {
    GriddedData {
        lat: vec![-10.0, 10.0],
        lon: vec![-10.0, 10.0],
        values: vec![1.0, 2.0, 3.0, 4.0],
        mask: None,
        min: None,
        max: None,
    }
}

/// Common vector lines as `(lon, lat)` pairs.
pub mod lines {
    /// Crosses the antimeridian between the second and third point.
    pub const DATELINE: &[(f64, f64)] = &[(178.0, 10.0), (179.0, 10.0), (-179.0, 10.0), (-178.0, 10.0)];

    /// Runs along 80°N into the masked corner of the map; the last two
    /// vertices fall outside the vector footprint.
    pub const POLAR_EDGE: &[(f64, f64)] =
        &[(130.0, 80.0), (140.0, 80.0), (150.0, 80.0), (160.0, 80.0), (170.0, 80.0)];

    /// Entirely outside the vector footprint.
    pub const OFF_MAP: &[(f64, f64)] = &[(170.0, 80.0), (180.0, 80.0)];

    /// Interior line that needs no splitting.
    pub const EQUATORIAL: &[(f64, f64)] = &[(-20.0, 0.0), (-10.0, 2.0), (0.0, 0.0), (10.0, -2.0)];
}
