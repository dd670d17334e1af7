//! Declarative colormaps.
//!
//! Palette definitions arrive as JSON objects of the form
//! `{"FullName": ..., "BuildFunction": "HEX" | "xorgb", "Values": [...]}`.
//! Both build functions reduce to a sorted list of [`ColorStop`]s which is
//! then expanded into a fixed 256-sample RGBA gradient.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::color::{unit_to_byte, Color};
use crate::error::{RenderError, RenderResult};

/// Number of samples in every built gradient.
pub const PALETTE_RESOLUTION: usize = 256;

/// A color anchored at a position in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub position: f64,
    pub color: Color,
}

impl ColorStop {
    pub fn new(position: f64, color: Color) -> Self {
        Self { position, color }
    }
}

/// How a definition's `Values` are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildFunction {
    /// Hex color strings spread at equal intervals.
    Hex,
    /// `{x, o?, r, g, b}` control points with 0-1 channels.
    Xorgb,
}

impl BuildFunction {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "hex" => Some(Self::Hex),
            "xorgb" => Some(Self::Xorgb),
            _ => None,
        }
    }
}

/// A palette definition as stored in the palette JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteDefinition {
    #[serde(rename = "FullName")]
    pub full_name: String,
    #[serde(rename = "BuildFunction")]
    pub build_function: String,
    #[serde(rename = "Values")]
    pub values: serde_json::Value,
}

/// One `xorgb` control point. Channels are normalized to 0-1.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct XorgbPoint {
    pub x: f64,
    #[serde(default)]
    pub o: Option<f64>,
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl PaletteDefinition {
    /// Resolve the definition into sorted color stops.
    ///
    /// Unknown build functions and `Values` of the wrong shape are errors.
    /// Individual unparseable colors are skipped with a warning.
    pub fn stops(&self) -> RenderResult<Vec<ColorStop>> {
        let function = BuildFunction::parse(&self.build_function).ok_or_else(|| {
            RenderError::Palette(format!(
                "{}: unknown build function '{}'",
                self.full_name, self.build_function
            ))
        })?;

        let stops = match function {
            BuildFunction::Hex => {
                let colors: Vec<String> = serde_json::from_value(self.values.clone())
                    .map_err(|e| {
                        RenderError::Palette(format!("{}: HEX values: {}", self.full_name, e))
                    })?;
                hex_stops(&self.full_name, &colors)
            }
            BuildFunction::Xorgb => {
                let points: Vec<XorgbPoint> = serde_json::from_value(self.values.clone())
                    .map_err(|e| {
                        RenderError::Palette(format!("{}: xorgb values: {}", self.full_name, e))
                    })?;
                xorgb_stops(&points)
            }
        };

        Ok(stops)
    }
}

/// Hex colors at equal intervals across [0, 1].
///
/// Unparseable entries are dropped before spacing, so the remaining colors
/// still cover the full range.
pub fn hex_stops(name: &str, colors: &[String]) -> Vec<ColorStop> {
    let parsed: Vec<Color> = colors
        .iter()
        .filter_map(|hex| {
            let color = Color::from_hex(hex);
            if color.is_none() {
                tracing::warn!(palette = name, color = %hex, "Skipping unparseable palette color");
            }
            color
        })
        .collect();

    let last = parsed.len().saturating_sub(1).max(1) as f64;
    parsed
        .into_iter()
        .enumerate()
        .map(|(i, color)| ColorStop::new(i as f64 / last, color))
        .collect()
}

/// Control points to stops, sorted by `x`. Opacity defaults to 1.
pub fn xorgb_stops(points: &[XorgbPoint]) -> Vec<ColorStop> {
    let mut stops: Vec<ColorStop> = points
        .iter()
        .filter(|p| p.x.is_finite())
        .map(|p| {
            let color = Color::new(
                unit_to_byte(p.r),
                unit_to_byte(p.g),
                unit_to_byte(p.b),
                unit_to_byte(p.o.unwrap_or(1.0)),
            );
            ColorStop::new(p.x.clamp(0.0, 1.0), color)
        })
        .collect();
    sort_stops(&mut stops);
    stops
}

fn sort_stops(stops: &mut [ColorStop]) {
    stops.sort_by(|a, b| a.position.total_cmp(&b.position));
}

/// Expand sorted stops into `resolution` RGBA samples.
///
/// Each sample interpolates channel-wise between the two bracketing stops.
/// Fewer than two stops produce a constant gradient (transparent when empty).
pub fn build_gradient(stops: &[ColorStop], resolution: usize) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(resolution * 4);

    let (first, last) = match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => {
            bytes.resize(resolution * 4, 0);
            return bytes;
        }
    };

    let denom = resolution.saturating_sub(1).max(1) as f64;
    for i in 0..resolution {
        let t = i as f64 / denom;
        let color = if t <= first.position {
            first.color
        } else if t >= last.position {
            last.color
        } else {
            let upper = stops
                .iter()
                .position(|s| s.position >= t)
                .unwrap_or(stops.len() - 1)
                .max(1);
            let lo = stops[upper - 1];
            let hi = stops[upper];
            let span = hi.position - lo.position;
            if span <= 0.0 {
                hi.color
            } else {
                lo.color.lerp(hi.color, (t - lo.position) / span)
            }
        };
        bytes.extend_from_slice(&color.to_array());
    }

    bytes
}

/// A built, immutable gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    name: String,
    stops: Vec<ColorStop>,
    bytes: Vec<u8>,
}

impl Palette {
    /// Build a palette from stops in any order.
    pub fn from_stops(name: impl Into<String>, mut stops: Vec<ColorStop>) -> Self {
        let name = name.into();
        stops.retain(|s| s.position.is_finite());
        sort_stops(&mut stops);
        if stops.len() < 2 {
            tracing::warn!(
                palette = %name,
                stops = stops.len(),
                "Palette has fewer than 2 stops, using a constant gradient"
            );
        }
        let bytes = build_gradient(&stops, PALETTE_RESOLUTION);
        Self { name, stops, bytes }
    }

    pub fn from_definition(definition: &PaletteDefinition) -> RenderResult<Self> {
        let stops = definition.stops()?;
        Ok(Self::from_stops(definition.full_name.clone(), stops))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// RGBA bytes, `PALETTE_RESOLUTION * 4` long.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn resolution(&self) -> usize {
        self.bytes.len() / 4
    }

    pub fn color_at_index(&self, index: usize) -> Color {
        let idx = index.min(self.resolution() - 1) * 4;
        Color::from_slice(&self.bytes[idx..idx + 4])
    }

    /// Color for a normalized position; out-of-range positions clamp to the ends.
    pub fn color_at(&self, t: f64) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let index = (t * (self.resolution() - 1) as f64).round() as usize;
        self.color_at_index(index)
    }

    /// `count` evenly spaced swatches as `#rrggbb`, first and last included.
    pub fn sample_hex(&self, count: usize) -> Vec<String> {
        sample_palette_hex(self, count)
    }
}

/// Extract `count` evenly spaced hex swatches from a palette.
pub fn sample_palette_hex(palette: &Palette, count: usize) -> Vec<String> {
    let max_index = palette.resolution() - 1;
    match count {
        0 => Vec::new(),
        1 => vec![palette.color_at_index(0).to_hex()],
        _ => (0..count)
            .map(|i| {
                let index = (i as f64 * max_index as f64 / (count - 1) as f64).round() as usize;
                palette.color_at_index(index).to_hex()
            })
            .collect(),
    }
}

/// Named palettes, built once and read-only afterwards.
///
/// Lookups of unknown names fall back to the first registered palette.
#[derive(Debug, Clone, Default)]
pub struct PaletteRegistry {
    palettes: Vec<Palette>,
    by_name: HashMap<String, usize>,
}

impl PaletteRegistry {
    /// Register palettes in order. A repeated name keeps the first entry.
    pub fn new(palettes: Vec<Palette>) -> Self {
        let mut registry = Self::default();
        for palette in palettes {
            if registry.by_name.contains_key(palette.name()) {
                tracing::warn!(palette = palette.name(), "Duplicate palette name ignored");
                continue;
            }
            registry
                .by_name
                .insert(palette.name().to_string(), registry.palettes.len());
            registry.palettes.push(palette);
        }
        registry
    }

    /// Build every definition; invalid definitions are logged and skipped.
    pub fn from_definitions(definitions: &[PaletteDefinition]) -> Self {
        let palettes = definitions
            .iter()
            .filter_map(|def| match Palette::from_definition(def) {
                Ok(palette) => Some(palette),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping palette definition");
                    None
                }
            })
            .collect();
        let registry = Self::new(palettes);
        tracing::info!(count = registry.len(), "Palette registry loaded");
        registry
    }

    /// Parse the palette JSON array and build the registry.
    pub fn from_json(json: &str) -> RenderResult<Self> {
        let definitions: Vec<PaletteDefinition> = serde_json::from_str(json)?;
        Ok(Self::from_definitions(&definitions))
    }

    /// Load the palette JSON array from a file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> RenderResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Palette by name, or the first registered palette when the name is unknown.
    pub fn get(&self, name: &str) -> Option<&Palette> {
        match self.by_name.get(name) {
            Some(&idx) => self.palettes.get(idx),
            None => self.palettes.first(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.palettes.iter().map(|p| p.name())
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    /// Hex swatches for a named palette (with fallback); empty if the registry is empty.
    pub fn sample_hex(&self, name: &str, count: usize) -> Vec<String> {
        self.get(name)
            .map(|p| sample_palette_hex(p, count))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_white() -> Palette {
        Palette::from_stops(
            "bw",
            vec![
                ColorStop::new(0.0, Color::opaque(0, 0, 0)),
                ColorStop::new(1.0, Color::opaque(255, 255, 255)),
            ],
        )
    }

    #[test]
    fn test_gradient_endpoints_and_midpoint() {
        let palette = black_white();
        assert_eq!(palette.as_bytes().len(), PALETTE_RESOLUTION * 4);
        assert_eq!(palette.color_at_index(0), Color::opaque(0, 0, 0));
        assert_eq!(palette.color_at_index(255), Color::opaque(255, 255, 255));
        assert_eq!(palette.color_at_index(51), Color::opaque(51, 51, 51));
    }

    #[test]
    fn test_stops_are_sorted() {
        let palette = Palette::from_stops(
            "rev",
            vec![
                ColorStop::new(1.0, Color::opaque(255, 255, 255)),
                ColorStop::new(0.0, Color::opaque(0, 0, 0)),
            ],
        );
        assert_eq!(palette, Palette::from_stops("rev", black_white().stops().to_vec()));
    }

    #[test]
    fn test_degenerate_palettes_are_constant() {
        let single = Palette::from_stops("one", vec![ColorStop::new(0.3, Color::opaque(1, 2, 3))]);
        for i in [0, 100, 255] {
            assert_eq!(single.color_at_index(i), Color::opaque(1, 2, 3));
        }

        let empty = Palette::from_stops("none", vec![]);
        assert!(empty.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_stops_before_first_and_after_last() {
        let palette = Palette::from_stops(
            "mid",
            vec![
                ColorStop::new(0.25, Color::opaque(10, 0, 0)),
                ColorStop::new(0.75, Color::opaque(20, 0, 0)),
            ],
        );
        assert_eq!(palette.color_at(0.0), Color::opaque(10, 0, 0));
        assert_eq!(palette.color_at(0.1), Color::opaque(10, 0, 0));
        assert_eq!(palette.color_at(0.9), Color::opaque(20, 0, 0));
        assert_eq!(palette.color_at(1.0), Color::opaque(20, 0, 0));
    }

    #[test]
    fn test_build_function_parse() {
        assert_eq!(BuildFunction::parse("HEX"), Some(BuildFunction::Hex));
        assert_eq!(BuildFunction::parse("xorgb"), Some(BuildFunction::Xorgb));
        assert_eq!(BuildFunction::parse("spline"), None);
    }

    #[test]
    fn test_sample_hex_counts() {
        let palette = black_white();
        assert!(palette.sample_hex(0).is_empty());
        assert_eq!(palette.sample_hex(1), vec!["#000000"]);
        assert_eq!(palette.sample_hex(2), vec!["#000000", "#ffffff"]);
    }
}
