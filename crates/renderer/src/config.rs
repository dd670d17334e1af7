//! Renderer configuration.
//!
//! The footprint slack factors and jump thresholds are empirically tuned; they
//! are exposed here so deployments can adjust them without code changes.

use serde::{Deserialize, Serialize};

use projection::InverseOptions;

/// Tunable parameters for compositing and vector projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Ellipse slack (compared against dx²+dy²) for raster pixels.
    pub composite_footprint_slack: f64,

    /// Ellipse slack for vector vertices.
    pub vector_footprint_slack: f64,

    /// Distance from ±180° within which two endpoints count as a dateline crossing.
    pub dateline_band_deg: f64,

    /// Longitude step above which a line is split.
    pub max_lon_jump_deg: f64,

    /// Latitude step above which a line is split.
    pub max_lat_jump_deg: f64,

    /// Screen-space jump, as a fraction of the larger canvas dimension.
    pub screen_jump_fraction: f64,

    /// Newton-Raphson iteration cap for the inverse projection.
    pub inverse_max_iterations: u32,

    /// Newton-Raphson convergence tolerance.
    pub inverse_tolerance: f64,

    /// Residual below which a non-converged inverse is still drawn.
    pub inverse_accept_error: f64,

    /// Render output rows on the rayon pool.
    pub parallel_rows: bool,

    /// Delay between progressive passes when no frame loop is available.
    pub progressive_stagger_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            composite_footprint_slack: 1.08,
            vector_footprint_slack: 1.05,
            dateline_band_deg: 10.0,
            max_lon_jump_deg: 30.0,
            max_lat_jump_deg: 20.0,
            screen_jump_fraction: 0.04,
            inverse_max_iterations: 40,
            inverse_tolerance: 1e-10,
            inverse_accept_error: 1e-3,
            parallel_rows: false,
            progressive_stagger_ms: 16,
        }
    }
}

impl RenderConfig {
    /// Load configuration from `WINKEL_*` environment variables.
    ///
    /// Missing or unparseable variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        env_parse("WINKEL_FOOTPRINT_SLACK", &mut config.composite_footprint_slack);
        env_parse("WINKEL_VECTOR_SLACK", &mut config.vector_footprint_slack);
        env_parse("WINKEL_DATELINE_BAND_DEG", &mut config.dateline_band_deg);
        env_parse("WINKEL_MAX_LON_JUMP_DEG", &mut config.max_lon_jump_deg);
        env_parse("WINKEL_MAX_LAT_JUMP_DEG", &mut config.max_lat_jump_deg);
        env_parse("WINKEL_SCREEN_JUMP_FRACTION", &mut config.screen_jump_fraction);
        env_parse("WINKEL_INVERSE_MAX_ITERATIONS", &mut config.inverse_max_iterations);
        env_parse("WINKEL_INVERSE_TOLERANCE", &mut config.inverse_tolerance);
        env_parse("WINKEL_INVERSE_ACCEPT_ERROR", &mut config.inverse_accept_error);
        env_parse("WINKEL_PROGRESSIVE_STAGGER_MS", &mut config.progressive_stagger_ms);

        if let Ok(val) = std::env::var("WINKEL_PARALLEL_ROWS") {
            config.parallel_rows = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("composite_footprint_slack", self.composite_footprint_slack),
            ("vector_footprint_slack", self.vector_footprint_slack),
            ("max_lon_jump_deg", self.max_lon_jump_deg),
            ("max_lat_jump_deg", self.max_lat_jump_deg),
            ("screen_jump_fraction", self.screen_jump_fraction),
            ("inverse_tolerance", self.inverse_tolerance),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{} must be a positive number, got {}", name, value));
            }
        }

        if !(self.dateline_band_deg.is_finite() && (0.0..=180.0).contains(&self.dateline_band_deg)) {
            return Err(format!(
                "dateline_band_deg must be within 0-180, got {}",
                self.dateline_band_deg
            ));
        }

        if self.inverse_max_iterations == 0 {
            return Err("inverse_max_iterations must be > 0".to_string());
        }

        if !(self.inverse_accept_error.is_finite() && self.inverse_accept_error >= 0.0) {
            return Err(format!(
                "inverse_accept_error must be >= 0, got {}",
                self.inverse_accept_error
            ));
        }

        Ok(())
    }

    /// Newton-Raphson options derived from this configuration.
    pub fn inverse_options(&self) -> InverseOptions {
        InverseOptions {
            max_iterations: self.inverse_max_iterations,
            tolerance: self.inverse_tolerance,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, target: &mut T) {
    if let Ok(val) = std::env::var(name) {
        match val.parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => tracing::warn!(variable = name, value = %val, "Ignoring unparseable setting"),
        }
    }
}
