//! Property tests for the Winkel Tripel projection.

use projection::{forward, inverse, winkel_tripel_bounds, InverseOptions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use test_utils::{assert_approx_eq, assert_geo_approx_eq};

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_round_trip_interior_grid() {
    let options = InverseOptions::default();
    let mut lon = -150.0;
    while lon <= 150.0 {
        let mut lat = -75.0;
        while lat <= 75.0 {
            let p = forward(lon, lat);
            let result = inverse(p.x, p.y, options);
            assert!(result.converged, "no convergence at ({}, {})", lon, lat);
            assert_geo_approx_eq!(result.point, (lon, lat), 1e-6);
            lat += 15.0;
        }
        lon += 15.0;
    }
}

#[test]
fn test_round_trip_clamped_input() {
    // Out-of-range input is clamped before projecting, so the inverse returns the clamped point.
    let p = forward(250.0, 12.0);
    let result = inverse(p.x, p.y, InverseOptions::default());
    assert!(result.converged);
    assert_geo_approx_eq!(result.point, (180.0, 12.0), 1e-6);
}

#[test]
fn test_round_trip_random_interior() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let lon: f64 = rng.gen_range(-160.0..160.0);
        let lat: f64 = rng.gen_range(-80.0..80.0);
        let p = forward(lon, lat);
        let result = inverse(p.x, p.y, InverseOptions::default());
        assert!(result.converged);
        assert!(result.error <= 1e-10);
        assert_geo_approx_eq!(result.point, (lon, lat), 1e-6);
    }
}

// ============================================================================
// Symmetry
// ============================================================================

#[test]
fn test_symmetry() {
    for &(lon, lat) in &[(30.0, 20.0), (120.0, -45.0), (179.0, 89.0), (5.0, 0.5)] {
        let p = forward(lon, lat);
        let mirrored_lon = forward(-lon, lat);
        let mirrored_lat = forward(lon, -lat);
        assert_eq!(mirrored_lon.x, -p.x);
        assert_eq!(mirrored_lon.y, p.y);
        assert_eq!(mirrored_lat.y, -p.y);
        assert_eq!(mirrored_lat.x, p.x);
    }
}

// ============================================================================
// Bounds
// ============================================================================

#[test]
fn test_bounds_contain_random_points() {
    let bounds = winkel_tripel_bounds();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..1000 {
        let lon: f64 = rng.gen_range(-180.0..=180.0);
        let lat: f64 = rng.gen_range(-90.0..=90.0);
        let p = forward(lon, lat);
        assert!(
            bounds.contains(p, 1e-6),
            "({}, {}) -> ({}, {}) outside bounds {:?}",
            lon,
            lat,
            p.x,
            p.y,
            bounds
        );
    }
}

// ============================================================================
// Acceptance near the outline
// ============================================================================

#[test]
fn test_clamped_stall_is_converged_but_not_acceptable() {
    // Beyond the equator's east end the update clamps at 180° and stops moving.
    // The step rule reports convergence; the residual shows the point is off the map.
    let bounds = winkel_tripel_bounds();
    for factor in [1.001, 1.03] {
        let x = bounds.x_max * factor;
        let result = inverse(x, 0.0, InverseOptions::default());

        assert!(result.converged);
        assert_geo_approx_eq!(result.point, (180.0, 0.0), 1e-9);
        assert_approx_eq!(result.error, x - bounds.x_max, 1e-9, "residual at factor {}", factor);
        assert!(!result.is_acceptable(1e-3));
    }
}

#[test]
fn test_points_on_the_outline_are_acceptable() {
    for &(lon, lat) in &[(180.0, 0.0), (-180.0, 45.0), (180.0, -89.0), (0.0, 90.0)] {
        let p = forward(lon, lat);
        let result = inverse(p.x, p.y, InverseOptions::default());
        assert!(
            result.is_acceptable(1e-3),
            "({}, {}) rejected with error {}",
            lon,
            lat,
            result.error
        );
    }
}

#[test]
fn test_unconverged_but_close_is_acceptable() {
    // A few iterations land close without meeting an unreachable tolerance.
    let p = forward(20.0, 10.0);
    let result = inverse(
        p.x,
        p.y,
        InverseOptions {
            max_iterations: 2,
            tolerance: 1e-15,
        },
    );
    assert!(!result.converged);
    assert!(result.error <= 1e-3);
    assert!(result.is_acceptable(1e-3));
}
