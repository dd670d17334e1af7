//! Pixel <-> projection-plane mapping.
//!
//! The projection bounds are fitted into the canvas, centered, scaled by the
//! user zoom and shifted by a pixel offset. Screen y grows downward.

use climate_common::ProjectionPoint;
use projection::ProjectionSpaceBounds;
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};

/// User-controlled zoom and pan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewParams {
    /// Zoom factor; 1 fits the whole map into the canvas.
    pub scale: f64,
    /// Pan in canvas pixels.
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl ViewParams {
    pub fn new(scale: f64, offset_x: f64, offset_y: f64) -> Self {
        Self {
            scale,
            offset_x,
            offset_y,
        }
    }

    pub fn validate(&self) -> RenderResult<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(RenderError::Config(format!(
                "view scale must be positive, got {}",
                self.scale
            )));
        }
        if !self.offset_x.is_finite() || !self.offset_y.is_finite() {
            return Err(RenderError::Config("view offset must be finite".to_string()));
        }
        Ok(())
    }
}

/// Affine mapping between canvas pixels and the projection plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    center: ProjectionPoint,
    origin_x: f64,
    origin_y: f64,
    /// Pixels per projection unit.
    fit: f64,
}

impl ViewTransform {
    pub fn new(
        canvas_width: f64,
        canvas_height: f64,
        bounds: &ProjectionSpaceBounds,
        view: &ViewParams,
    ) -> Self {
        let fit = (canvas_width / bounds.width).min(canvas_height / bounds.height) * view.scale;
        Self {
            center: bounds.center(),
            origin_x: canvas_width / 2.0 + view.offset_x,
            origin_y: canvas_height / 2.0 + view.offset_y,
            fit,
        }
    }

    pub fn pixels_per_unit(&self) -> f64 {
        self.fit
    }

    #[inline]
    pub fn pixel_to_projection(&self, px: f64, py: f64) -> ProjectionPoint {
        ProjectionPoint::new(
            self.center.x + (px - self.origin_x) / self.fit,
            self.center.y - (py - self.origin_y) / self.fit,
        )
    }

    #[inline]
    pub fn projection_to_pixel(&self, point: ProjectionPoint) -> (f64, f64) {
        (
            self.origin_x + (point.x - self.center.x) * self.fit,
            self.origin_y - (point.y - self.center.y) * self.fit,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use projection::winkel_tripel_bounds;

    #[test]
    fn test_center_maps_to_canvas_center() {
        let bounds = winkel_tripel_bounds();
        let t = ViewTransform::new(400.0, 200.0, &bounds, &ViewParams::default());
        let (px, py) = t.projection_to_pixel(ProjectionPoint::new(0.0, 0.0));
        assert!((px - 200.0).abs() < 1e-9);
        assert!((py - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_and_orientation() {
        let bounds = winkel_tripel_bounds();
        let view = ViewParams::new(2.5, 13.0, -7.0);
        let t = ViewTransform::new(640.0, 480.0, &bounds, &view);
        let p = t.pixel_to_projection(10.0, 20.0);
        let (px, py) = t.projection_to_pixel(p);
        assert!((px - 10.0).abs() < 1e-9);
        assert!((py - 20.0).abs() < 1e-9);

        // North is up.
        let (_, y_north) = t.projection_to_pixel(ProjectionPoint::new(0.0, 1.0));
        let (_, y_south) = t.projection_to_pixel(ProjectionPoint::new(0.0, -1.0));
        assert!(y_north < y_south);
    }

    #[test]
    fn test_whole_map_fits() {
        let bounds = winkel_tripel_bounds();
        let t = ViewTransform::new(400.0, 400.0, &bounds, &ViewParams::default());
        let (left, _) = t.projection_to_pixel(ProjectionPoint::new(bounds.x_min, 0.0));
        let (right, _) = t.projection_to_pixel(ProjectionPoint::new(bounds.x_max, 0.0));
        assert!(left >= -1e-9 && right <= 400.0 + 1e-9);
        assert!((right - left - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_validate() {
        assert!(ViewParams::default().validate().is_ok());
        assert!(ViewParams::new(0.0, 0.0, 0.0).validate().is_err());
        assert!(ViewParams::new(1.0, f64::NAN, 0.0).validate().is_err());
    }
}
