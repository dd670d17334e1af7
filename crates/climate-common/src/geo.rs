//! Geographic and projection-plane coordinate types.

use serde::{Deserialize, Serialize};

/// A geographic location in degrees.
///
/// Longitude is expected in [-180, 180] and latitude in [-90, 90]. Use
/// [`GeoPoint::clamped`] to sanitize arbitrary input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Clamp into the valid geographic range.
    ///
    /// Non-finite components collapse to 0 (NaN) or the nearest limit (±inf),
    /// so the result is always usable by the projection.
    pub fn clamped(self) -> Self {
        Self {
            lon: clamp_finite(self.lon, -180.0, 180.0),
            lat: clamp_finite(self.lat, -90.0, 90.0),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// Clamp a value, mapping NaN to zero.
pub fn clamp_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(min, max)
    }
}

/// A point on the projection plane, in projection units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub x: f64,
    pub y: f64,
}

impl ProjectionPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Geographic extent of a raster, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoRectangle {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl GeoRectangle {
    /// The whole globe.
    pub const WORLD: GeoRectangle = GeoRectangle {
        west: -180.0,
        east: 180.0,
        south: -90.0,
        north: 90.0,
    };

    pub fn new(west: f64, east: f64, south: f64, north: f64) -> Self {
        Self {
            west,
            east,
            south,
            north,
        }
    }

    /// A rectangle is usable only when it has positive, finite extent on both axes.
    pub fn is_valid(&self) -> bool {
        self.west.is_finite()
            && self.east.is_finite()
            && self.south.is_finite()
            && self.north.is_finite()
            && self.west < self.east
            && self.south < self.north
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lon >= self.west
            && point.lon <= self.east
            && point.lat >= self.south
            && point.lat <= self.north
    }

    /// Map a point into local unit space: u runs west to east, v runs north to south.
    pub fn to_local(&self, point: GeoPoint) -> (f64, f64) {
        let u = (point.lon - self.west) / (self.east - self.west);
        let v = (self.north - point.lat) / (self.north - self.south);
        (u, v)
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_handles_out_of_range_and_nan() {
        let p = GeoPoint::new(200.0, -95.0).clamped();
        assert_eq!(p, GeoPoint::new(180.0, -90.0));

        let p = GeoPoint::new(f64::NAN, f64::INFINITY).clamped();
        assert_eq!(p, GeoPoint::new(0.0, 90.0));
    }

    #[test]
    fn test_rectangle_validity() {
        assert!(GeoRectangle::WORLD.is_valid());
        assert!(!GeoRectangle::new(10.0, 10.0, -5.0, 5.0).is_valid());
        assert!(!GeoRectangle::new(-10.0, 10.0, 5.0, -5.0).is_valid());
        assert!(!GeoRectangle::new(f64::NAN, 10.0, -5.0, 5.0).is_valid());
    }

    #[test]
    fn test_rectangle_local_space() {
        let rect = GeoRectangle::new(-10.0, 10.0, -20.0, 20.0);
        assert_eq!(rect.to_local(GeoPoint::new(-10.0, 20.0)), (0.0, 0.0));
        assert_eq!(rect.to_local(GeoPoint::new(10.0, -20.0)), (1.0, 1.0));
        assert_eq!(rect.to_local(GeoPoint::new(0.0, 0.0)), (0.5, 0.5));
        assert!(rect.contains(GeoPoint::new(10.0, 20.0)));
        assert!(!rect.contains(GeoPoint::new(10.1, 0.0)));
    }
}
