//! Projection-space extent of the Winkel Tripel map.
//!
//! Bounds are derived by probing [`forward`](crate::winkel::forward) on a
//! coarse meridian/parallel grid and taking the extrema. The default value is
//! computed once on first use and never changes afterwards.

use std::sync::LazyLock;

use climate_common::ProjectionPoint;

use crate::winkel::forward;

/// Spacing of the probing grid, in degrees.
pub const SCAN_STEP_DEG: f64 = 10.0;

/// Default Winkel Tripel bounds, scanned at [`SCAN_STEP_DEG`].
pub static WINKEL_TRIPEL_BOUNDS: LazyLock<ProjectionSpaceBounds> =
    LazyLock::new(|| ProjectionSpaceBounds::scan(SCAN_STEP_DEG));

/// Copy of the default bounds.
pub fn winkel_tripel_bounds() -> ProjectionSpaceBounds {
    *WINKEL_TRIPEL_BOUNDS
}

/// Axis-aligned extent of the projection plane.
///
/// `width = x_max - x_min` and `height = y_max - y_min`, both positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionSpaceBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub width: f64,
    pub height: f64,
}

impl ProjectionSpaceBounds {
    /// Build bounds from extrema. Returns `None` unless both extents are positive.
    pub fn from_extrema(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Option<Self> {
        let width = x_max - x_min;
        let height = y_max - y_min;
        if width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite() {
            Some(Self {
                x_min,
                x_max,
                y_min,
                y_max,
                width,
                height,
            })
        } else {
            None
        }
    }

    /// Scan the forward projection every `step_deg` degrees and take the extrema.
    ///
    /// The scan always includes ±180° longitude and ±90° latitude.
    pub fn scan(step_deg: f64) -> Self {
        let step = if step_deg.is_finite() && step_deg > 0.0 {
            step_deg
        } else {
            SCAN_STEP_DEG
        };
        let lon_steps = (360.0 / step).ceil() as usize;
        let lat_steps = (180.0 / step).ceil() as usize;

        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;

        for i in 0..=lon_steps {
            let lon = (-180.0 + i as f64 * step).min(180.0);
            for j in 0..=lat_steps {
                let lat = (-90.0 + j as f64 * step).min(90.0);
                let p = forward(lon, lat);
                x_min = x_min.min(p.x);
                x_max = x_max.max(p.x);
                y_min = y_min.min(p.y);
                y_max = y_max.max(p.y);
            }
        }

        Self {
            x_min,
            x_max,
            y_min,
            y_max,
            width: x_max - x_min,
            height: y_max - y_min,
        }
    }

    pub fn center(&self) -> ProjectionPoint {
        ProjectionPoint::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// Squared normalized distance from the center, treating the bounds as an ellipse.
    ///
    /// Values ≤ 1 lie inside the inscribed ellipse.
    pub fn ellipse_distance_sq(&self, point: ProjectionPoint) -> f64 {
        let center = self.center();
        let dx = (point.x - center.x) / (self.width / 2.0);
        let dy = (point.y - center.y) / (self.height / 2.0);
        dx * dx + dy * dy
    }

    /// Footprint mask: inside the ellipse, widened by `slack` (compared against dx²+dy²).
    pub fn within_footprint(&self, point: ProjectionPoint, slack: f64) -> bool {
        self.ellipse_distance_sq(point) <= slack
    }

    /// Rectangular containment with an absolute tolerance.
    pub fn contains(&self, point: ProjectionPoint, epsilon: f64) -> bool {
        point.x >= self.x_min - epsilon
            && point.x <= self.x_max + epsilon
            && point.y >= self.y_min - epsilon
            && point.y <= self.y_max + epsilon
    }
}
