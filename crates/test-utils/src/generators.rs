//! Test data generators for creating synthetic climate-like data.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

use climate_common::GriddedData;

/// `n` evenly spaced values from `start` to `end` inclusive.
///
/// A single value sits at the midpoint.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![(start + end) / 2.0],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Creates a global grid with predictable values.
///
/// Latitude runs south to north and longitude west to east, both spanning
/// the full globe. Each cell value is `col * 1000 + row`.
///
/// # Example
///
/// ```
/// use test_utils::synthetic_grid;
///
/// let grid = synthetic_grid(3, 4);
/// assert_eq!(grid.values.len(), 12);
/// assert_eq!(grid.values[1], 1000.0); // row 0, col 1
/// assert_eq!(grid.values[4], 1.0);    // row 1, col 0
/// assert_eq!(grid.lat, vec![-90.0, 0.0, 90.0]);
/// ```
pub fn synthetic_grid(rows: usize, cols: usize) -> GriddedData {
    let mut values = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            values.push((col * 1000 + row) as f64);
        }
    }
    GriddedData {
        lat: linspace(-90.0, 90.0, rows),
        lon: linspace(-180.0, 180.0, cols),
        values,
        mask: None,
        min: None,
        max: None,
    }
}

/// Creates a global near-surface temperature field in Kelvin.
///
/// Warm at the equator (~300K), cold at the poles (~240K), with a gentle
/// zonal wave so neighboring columns differ.
pub fn temperature_field(rows: usize, cols: usize) -> GriddedData {
    let lat = linspace(-90.0, 90.0, rows);
    let lon = linspace(-180.0, 180.0, cols);

    let mut values = Vec::with_capacity(rows * cols);
    for &phi in &lat {
        for &lambda in &lon {
            let t = 240.0 + 60.0 * phi.to_radians().cos() + 4.0 * (2.0 * lambda.to_radians()).sin();
            values.push(t);
        }
    }

    GriddedData {
        lat,
        lon,
        values,
        mask: None,
        min: None,
        max: None,
    }
}

/// A land/sea style mask: cells poleward of `cutoff_deg` are no-data.
pub fn polar_mask(grid: &GriddedData, cutoff_deg: f64) -> Vec<u8> {
    let mut mask = Vec::with_capacity(grid.values.len());
    for &phi in &grid.lat {
        let valid = u8::from(phi.abs() <= cutoff_deg);
        mask.extend(std::iter::repeat(valid).take(grid.lon.len()));
    }
    mask
}

/// RGBA checkerboard with square cells of `cell` pixels.
///
/// The top-left cell uses `a`.
pub fn checkerboard_image(width: usize, height: usize, cell: usize, a: [u8; 4], b: [u8; 4]) -> Vec<u8> {
    let cell = cell.max(1);
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let color = if (x / cell + y / cell) % 2 == 0 { a } else { b };
            pixels.extend_from_slice(&color);
        }
    }
    pixels
}
