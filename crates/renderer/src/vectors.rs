//! Vector feature projection with dateline and pole splitting.
//!
//! Projecting a line that wraps around the antimeridian, or passes near a
//! pole, straight through the projection draws a stroke across the whole map.
//! Lines are therefore split twice: once in geographic space on suspicious
//! coordinate jumps, then again in screen space where the footprint mask drops
//! vertices or consecutive vertices land implausibly far apart.

use climate_common::GeoPoint;
use projection::{forward, ProjectionSpaceBounds};
use serde::{Deserialize, Serialize};

use crate::config::RenderConfig;
use crate::error::RenderResult;
use crate::view::{ViewParams, ViewTransform};

/// A geographic polyline such as a coastline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorFeature {
    pub id: String,
    pub points: Vec<GeoPoint>,
}

impl VectorFeature {
    pub fn new(id: impl Into<String>, points: Vec<GeoPoint>) -> Self {
        Self {
            id: id.into(),
            points,
        }
    }
}

/// A point in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// The screen-space polylines of one feature. Every polyline has at least two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedVectorSegments {
    pub id: String,
    pub polylines: Vec<Vec<ScreenPoint>>,
}

/// Whether the step from `a` to `b` must not be drawn as one stroke.
fn is_geographic_break(a: GeoPoint, b: GeoPoint, config: &RenderConfig) -> bool {
    let dlon = (b.lon - a.lon).abs();
    let dlat = (b.lat - a.lat).abs();

    if dlon > 180.0 {
        return true;
    }

    let edge = 180.0 - config.dateline_band_deg;
    let crosses_dateline = (a.lon >= edge && b.lon <= -edge) || (a.lon <= -edge && b.lon >= edge);
    if crosses_dateline {
        return true;
    }

    dlat > config.max_lat_jump_deg || dlon > config.max_lon_jump_deg
}

/// Split a point sequence on geographic jumps. Runs shorter than two points are dropped.
pub fn split_geographic(points: &[GeoPoint], config: &RenderConfig) -> Vec<Vec<GeoPoint>> {
    let mut segments = Vec::new();
    let mut current: Vec<GeoPoint> = Vec::new();

    for point in points.iter().map(|p| p.clamped()) {
        if let Some(&last) = current.last() {
            if is_geographic_break(last, point, config) {
                let done = std::mem::take(&mut current);
                if done.len() >= 2 {
                    segments.push(done);
                }
            }
        }
        current.push(point);
    }
    if current.len() >= 2 {
        segments.push(current);
    }

    segments
}

/// Projects geographic segments to the canvas, applying the footprint mask
/// and the screen-space jump rule.
struct ScreenSplitter<'a> {
    transform: ViewTransform,
    bounds: &'a ProjectionSpaceBounds,
    slack: f64,
    max_jump_px: f64,
}

impl ScreenSplitter<'_> {
    fn split(&self, segment: &[GeoPoint], out: &mut Vec<Vec<ScreenPoint>>) {
        let mut current: Vec<ScreenPoint> = Vec::new();

        for point in segment {
            let projected = forward(point.lon, point.lat);
            if !self.bounds.within_footprint(projected, self.slack) {
                flush(&mut current, out);
                continue;
            }

            let (x, y) = self.transform.projection_to_pixel(projected);
            let screen = ScreenPoint { x, y };
            if let Some(last) = current.last() {
                if (screen.x - last.x).hypot(screen.y - last.y) > self.max_jump_px {
                    flush(&mut current, out);
                }
            }
            current.push(screen);
        }
        flush(&mut current, out);
    }
}

fn flush(current: &mut Vec<ScreenPoint>, out: &mut Vec<Vec<ScreenPoint>>) {
    let done = std::mem::take(current);
    if done.len() >= 2 {
        out.push(done);
    }
}

/// Project features onto a `canvas_width x canvas_height` canvas.
///
/// Features whose every vertex is masked or isolated produce no output entry.
pub fn project_vectors(
    features: &[VectorFeature],
    canvas_width: usize,
    canvas_height: usize,
    view: &ViewParams,
    bounds: &ProjectionSpaceBounds,
    config: &RenderConfig,
) -> RenderResult<Vec<ProjectedVectorSegments>> {
    view.validate()?;

    let splitter = ScreenSplitter {
        transform: ViewTransform::new(canvas_width as f64, canvas_height as f64, bounds, view),
        bounds,
        slack: config.vector_footprint_slack,
        max_jump_px: config.screen_jump_fraction * canvas_width.max(canvas_height) as f64,
    };

    let mut projected = Vec::with_capacity(features.len());
    let mut polyline_count = 0;
    for feature in features {
        let mut polylines = Vec::new();
        for segment in split_geographic(&feature.points, config) {
            splitter.split(&segment, &mut polylines);
        }
        if polylines.is_empty() {
            continue;
        }
        polyline_count += polylines.len();
        projected.push(ProjectedVectorSegments {
            id: feature.id.clone(),
            polylines,
        });
    }

    tracing::debug!(
        features = features.len(),
        drawn_features = projected.len(),
        polylines = polyline_count,
        "Vectors projected"
    );

    Ok(projected)
}
