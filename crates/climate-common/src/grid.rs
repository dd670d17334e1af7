//! Gridded climate data as delivered by the data backend.

use crate::error::{ClimateError, ClimateResult};
use crate::geo::GeoRectangle;
use serde::{Deserialize, Serialize};

/// A regular lat/lon grid of values in row-major order.
///
/// `rows = lat.len()`, `cols = lon.len()`, and `values[row * cols + col]` is the
/// value at `(lon[col], lat[row])`. Rows may run south-to-north or
/// north-to-south; consumers must not assume either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GriddedData {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    pub values: Vec<f64>,
    /// Per-cell validity; a zero entry marks the cell as no-data.
    #[serde(default)]
    pub mask: Option<Vec<u8>>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl GriddedData {
    /// Create a grid and validate its shape.
    pub fn new(lat: Vec<f64>, lon: Vec<f64>, values: Vec<f64>) -> ClimateResult<Self> {
        let grid = Self {
            lat,
            lon,
            values,
            mask: None,
            min: None,
            max: None,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Build a grid from single-precision values.
    pub fn from_f32(lat: Vec<f64>, lon: Vec<f64>, values: &[f32]) -> ClimateResult<Self> {
        Self::new(lat, lon, values.iter().map(|&v| v as f64).collect())
    }

    /// Parse and validate a grid from JSON.
    pub fn from_json(json: &str) -> ClimateResult<Self> {
        let grid: Self = serde_json::from_str(json)?;
        grid.validate()?;
        Ok(grid)
    }

    pub fn with_mask(mut self, mask: Vec<u8>) -> ClimateResult<Self> {
        self.mask = Some(mask);
        self.validate()?;
        Ok(self)
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn rows(&self) -> usize {
        self.lat.len()
    }

    pub fn cols(&self) -> usize {
        self.lon.len()
    }

    /// Check axis lengths, value count and mask length.
    pub fn validate(&self) -> ClimateResult<()> {
        if self.lat.is_empty() || self.lon.is_empty() {
            return Err(ClimateError::InvalidGrid(
                "lat and lon axes must be non-empty".to_string(),
            ));
        }
        if self.lat.iter().chain(self.lon.iter()).any(|v| !v.is_finite()) {
            return Err(ClimateError::InvalidGrid(
                "axis coordinates must be finite".to_string(),
            ));
        }
        let expected = self.rows() * self.cols();
        if self.values.len() != expected {
            return Err(ClimateError::InvalidGrid(format!(
                "expected {} values ({} rows x {} cols), got {}",
                expected,
                self.rows(),
                self.cols(),
                self.values.len()
            )));
        }
        if let Some(mask) = &self.mask {
            if mask.len() != expected {
                return Err(ClimateError::InvalidGrid(format!(
                    "mask length {} does not match {} values",
                    mask.len(),
                    expected
                )));
            }
        }
        Ok(())
    }

    /// Value at a cell, or `None` when masked, non-finite or out of range.
    pub fn value_at(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        let idx = row * self.cols() + col;
        if let Some(mask) = &self.mask {
            if mask.get(idx).copied().unwrap_or(0) == 0 {
                return None;
            }
        }
        self.values.get(idx).copied().filter(|v| v.is_finite())
    }

    /// The value range used for color scaling.
    ///
    /// Explicit `min`/`max` win; missing bounds are filled from the valid data.
    /// Returns `None` when no bound can be determined.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut data_min = f64::INFINITY;
        let mut data_max = f64::NEG_INFINITY;
        if self.min.is_none() || self.max.is_none() {
            for row in 0..self.rows() {
                for col in 0..self.cols() {
                    if let Some(v) = self.value_at(row, col) {
                        data_min = data_min.min(v);
                        data_max = data_max.max(v);
                    }
                }
            }
        }

        let min = self.min.filter(|v| v.is_finite()).unwrap_or(data_min);
        let max = self.max.filter(|v| v.is_finite()).unwrap_or(data_max);
        if min.is_finite() && max.is_finite() {
            Some((min, max))
        } else {
            None
        }
    }

    /// Geographic extent spanned by the grid's axis coordinates, as stored.
    ///
    /// A 0..360 longitude axis yields an east edge past 180; the renderer
    /// wraps such axes when colorizing.
    pub fn rectangle(&self) -> GeoRectangle {
        let (west, east) = extent(&self.lon);
        let (south, north) = extent(&self.lat);
        GeoRectangle::new(west, east, south, north)
    }

    /// True when row 0 is the southernmost row.
    pub fn lat_ascending(&self) -> bool {
        self.lat.first() <= self.lat.last()
    }
}

fn extent(axis: &[f64]) -> (f64, f64) {
    axis.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}
