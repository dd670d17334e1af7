//! Winkel Tripel projection.
//!
//! The projection is the arithmetic mean of an Aitoff-style azimuthal term and
//! an equirectangular term whose standard parallel is `acos(2/π)`.
//!
//! There is no closed-form inverse, so [`inverse`] runs a 2-D Newton-Raphson
//! iteration with a finite-difference Jacobian. Failure to converge is a normal
//! outcome near the outline of the map and is reported, never raised.

use std::f64::consts::{FRAC_PI_2, PI};

use climate_common::geo::clamp_finite;
use climate_common::{GeoPoint, ProjectionPoint};
use nalgebra::{Matrix2, Vector2};

/// Standard parallel φ₁ in radians (≈ 50.467°).
pub const STANDARD_PARALLEL: f64 = 0.880_689_235_420_356_6;

/// Below this |sin(alpha)| the sinc term is taken as 1.
const SINC_EPSILON: f64 = 1e-12;

/// Finite-difference step for the Jacobian, in radians.
const JACOBIAN_STEP: f64 = 1e-6;

/// Newton iteration stops when the Jacobian becomes this close to singular.
const MIN_DETERMINANT: f64 = 1e-18;

#[inline]
fn cos_phi1() -> f64 {
    STANDARD_PARALLEL.cos()
}

/// Forward projection in radians, without clamping.
#[inline]
pub(crate) fn forward_rad(lambda: f64, phi: f64) -> (f64, f64) {
    let cos_phi = phi.cos();
    let half_lambda = lambda / 2.0;

    let alpha = (cos_phi * half_lambda.cos()).clamp(-1.0, 1.0).acos();
    let sin_alpha = alpha.sin();
    let sinc = if sin_alpha.abs() < SINC_EPSILON {
        1.0
    } else {
        alpha / sin_alpha
    };

    let x_aitoff = 2.0 * cos_phi * half_lambda.sin() * sinc;
    let y_aitoff = phi.sin() * sinc;

    let x_equirect = lambda * cos_phi1();
    let y_equirect = phi;

    (
        (x_aitoff + x_equirect) / 2.0,
        (y_aitoff + y_equirect) / 2.0,
    )
}

/// Project a geographic point (degrees) onto the Winkel Tripel plane.
///
/// Longitude is clamped to [-180, 180] and latitude to [-90, 90]; NaN input
/// is treated as 0.
pub fn forward(lon_deg: f64, lat_deg: f64) -> ProjectionPoint {
    let lon = clamp_finite(lon_deg, -180.0, 180.0);
    let lat = clamp_finite(lat_deg, -90.0, 90.0);
    let (x, y) = forward_rad(lon.to_radians(), lat.to_radians());
    ProjectionPoint::new(x, y)
}

/// Parameters for the Newton-Raphson inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseOptions {
    pub max_iterations: u32,
    /// Convergence threshold for both the residual and the update step.
    pub tolerance: f64,
}

impl Default for InverseOptions {
    fn default() -> Self {
        Self {
            max_iterations: 40,
            tolerance: 1e-10,
        }
    }
}

/// Outcome of an inverse projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseResult {
    /// Best estimate, clamped to valid geographic ranges.
    pub point: GeoPoint,
    pub converged: bool,
    pub iterations: u32,
    /// Smallest max-norm residual observed, in projection units.
    pub error: f64,
}

impl InverseResult {
    /// Accept the result if its residual is within `max_error`, converged or not.
    ///
    /// `converged` alone is not enough: an update clamped at ±180° or ±90°
    /// stops moving and reports convergence while the residual stays large,
    /// which happens for points beyond the map outline. Renderers pass a
    /// loose threshold so the edge does not show holes where Newton stalls
    /// just short of full convergence.
    pub fn is_acceptable(&self, max_error: f64) -> bool {
        self.error <= max_error
    }
}

/// Invert the projection: find the geographic point whose forward image is `(x, y)`.
pub fn inverse(x: f64, y: f64, options: InverseOptions) -> InverseResult {
    let tolerance = options.tolerance;

    if !x.is_finite() || !y.is_finite() {
        return InverseResult {
            point: GeoPoint::new(0.0, 0.0),
            converged: false,
            iterations: 0,
            error: f64::INFINITY,
        };
    }

    let mut lambda = (x / cos_phi1()).clamp(-PI, PI);
    let mut phi = y.clamp(-FRAC_PI_2, FRAC_PI_2);

    let mut best_error = f64::INFINITY;
    let mut converged = false;
    let mut iterations = 0;

    while iterations < options.max_iterations {
        iterations += 1;

        let (fx, fy) = forward_rad(lambda, phi);
        let residual = Vector2::new(fx - x, fy - y);
        let error = residual.x.abs().max(residual.y.abs());
        best_error = best_error.min(error);
        if error <= tolerance {
            converged = true;
            break;
        }

        let (fx_l, fy_l) = forward_rad(lambda + JACOBIAN_STEP, phi);
        let (fx_p, fy_p) = forward_rad(lambda, phi + JACOBIAN_STEP);
        let jacobian = Matrix2::new(
            (fx_l - fx) / JACOBIAN_STEP,
            (fx_p - fx) / JACOBIAN_STEP,
            (fy_l - fy) / JACOBIAN_STEP,
            (fy_p - fy) / JACOBIAN_STEP,
        );

        if jacobian.determinant().abs() < MIN_DETERMINANT {
            break;
        }
        let Some(jacobian_inv) = jacobian.try_inverse() else {
            break;
        };
        let delta = jacobian_inv * residual;

        let next_lambda = (lambda - delta.x).clamp(-PI, PI);
        let next_phi = (phi - delta.y).clamp(-FRAC_PI_2, FRAC_PI_2);
        let step = (next_lambda - lambda).abs().max((next_phi - phi).abs());
        lambda = next_lambda;
        phi = next_phi;

        if step <= tolerance {
            let (fx, fy) = forward_rad(lambda, phi);
            best_error = best_error.min((fx - x).abs().max((fy - y).abs()));
            converged = true;
            break;
        }
    }

    InverseResult {
        point: GeoPoint::new(lambda.to_degrees(), phi.to_degrees()).clamped(),
        converged,
        iterations,
        error: best_error,
    }
}
