//! Randomized geometric property tests.
//!
//! Every test draws from a fixed-seed generator so failures are repeatable.

use approx::assert_relative_eq;
use palaeomag::{
    FisherParams, FisherValues, GreatCircle, Location, MeasurementAxis, PcaFit, StatsConfig,
    Tensor, Vec3,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

// =============================================================================
// GENERATORS
// =============================================================================

/// Vector with components uniform in `[-5, 5)`.
fn random_vec(rng: &mut StdRng) -> Vec3 {
    Vec3::new(
        rng.gen_range(-5.0..5.0),
        rng.gen_range(-5.0..5.0),
        rng.gen_range(-5.0..5.0),
    )
}

/// Unit vector scattered within roughly `spread_deg` of `centre`.
fn scattered_around(rng: &mut StdRng, centre: Vec3, spread_deg: f64) -> Vec3 {
    let offset = Vec3::new(
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
    );
    (centre.normalize() + offset * spread_deg.to_radians()).normalize()
}

/// Unsigned angle in degrees between two unit vectors.
fn separation_deg(a: Vec3, b: Vec3) -> f64 {
    a.dot(b).clamp(-1.0, 1.0).acos().to_degrees()
}

// =============================================================================
// VECTOR ALGEBRA
// =============================================================================

const ROTATION_AXES: [MeasurementAxis; 3] = [MeasurementAxis::X, MeasurementAxis::Y, MeasurementAxis::Z];

#[test]
fn test_half_turn_twice_is_identity() {
    let mut rng = StdRng::seed_from_u64(31);
    for _ in 0..50 {
        let v = random_vec(&mut rng);
        for axis in ROTATION_AXES {
            let once = v.rot180(axis);
            assert_relative_eq!(once.mag(), v.mag(), epsilon = 1e-12);
            assert_eq!(once.rot180(axis), v);
        }
    }
}

#[test]
fn test_half_turns_about_all_axes_compose_to_identity() {
    let mut rng = StdRng::seed_from_u64(37);
    for _ in 0..50 {
        let v = random_vec(&mut rng);
        let xy = v.rot180(MeasurementAxis::X).rot180(MeasurementAxis::Y);
        assert_eq!(xy, v.rot180(MeasurementAxis::Z));
        assert_eq!(xy.rot180(MeasurementAxis::Z), v);
    }
}

#[test]
fn test_invert_cancels_and_preserves_magnitude() {
    let mut rng = StdRng::seed_from_u64(41);
    for _ in 0..50 {
        let v = random_vec(&mut rng);
        let inverted = v.invert();
        assert!((v + inverted).mag() < 1e-12);
        assert_relative_eq!(inverted.mag(), v.mag(), epsilon = 1e-12);
        assert_eq!(inverted.invert(), v);
    }
}

#[test]
fn test_hadamard_product_and_quotient() {
    let mut rng = StdRng::seed_from_u64(43);
    for _ in 0..50 {
        let a = random_vec(&mut rng);
        let b = random_vec(&mut rng);
        let product = a.hadamard(b);
        assert_eq!(product, Vec3::new(a.x * b.x, a.y * b.y, a.z * b.z));
        assert_eq!(product, b.hadamard(a));

        let back = product.hadamard_div(b);
        assert_relative_eq!(back.x, a.x, epsilon = 1e-9);
        assert_relative_eq!(back.y, a.y, epsilon = 1e-9);
        assert_relative_eq!(back.z, a.z, epsilon = 1e-9);
    }
}

// =============================================================================
// GREAT CIRCLES
// =============================================================================

#[test]
fn test_circle_nearest_point_matches_pole_formula() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..20 {
        let n = rng.gen_range(4..14);
        let points: Vec<Vec3> = (0..n).map(|_| random_vec(&mut rng)).collect();
        let circle = GreatCircle::fit(&points).unwrap();
        let other = random_vec(&mut rng).normalize();

        let nearest = circle.nearest_on_circle(other);
        assert!(nearest.is_close(circle.pole().nearest_on_circle(other), 1e-9).unwrap());
        assert_relative_eq!(nearest.mag(), 1.0, epsilon = 1e-12);
        assert!(nearest.dot(circle.pole()).abs() < 1e-9);
        assert_eq!(circle.last_point().unwrap(), points[n - 1].normalize());
    }
}

#[test]
fn test_angle_from_last_is_zero_on_last_point() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..20 {
        let points: Vec<Vec3> = (0..6).map(|_| random_vec(&mut rng)).collect();
        let circle = GreatCircle::fit(&points).unwrap();
        let last = circle.nearest_on_circle(circle.last_point().unwrap());
        let angle = circle.angle_from_last(last).unwrap();
        assert!(angle.abs() < 1e-6, "angle {angle}");
        let any = circle.angle_from_last(random_vec(&mut rng).normalize()).unwrap();
        assert!(any.abs() <= PI / 2.0 + 1e-12);
    }
}

#[test]
fn test_great_circle_points_lie_on_circle() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..10 {
        let pole = random_vec(&mut rng).normalize();
        let points = pole.great_circle_points(36, true).unwrap();
        assert_eq!(points.len(), 37);
        assert_eq!(points.first(), points.last());
        for p in &points {
            assert!(p.dot(pole).abs() < 1e-9);
        }
    }
}

// =============================================================================
// SMALL CIRCLES AND INTERPOLATION
// =============================================================================

#[test]
fn test_small_circle_radius() {
    let mut rng = StdRng::seed_from_u64(11);
    let step = StatsConfig::default().small_circle_step_deg;
    for _ in 0..10 {
        let centre = random_vec(&mut rng).normalize();
        let radius = rng.gen_range(1.0..60.0);
        let circle = centre.small_circle_with_step(radius, step).unwrap();
        for p in &circle {
            assert_relative_eq!(separation_deg(*p, centre), radius, epsilon = 1e-6);
        }
    }
}

#[test]
fn test_spherical_interpolation_stays_on_arc() {
    let mut rng = StdRng::seed_from_u64(29);
    for _ in 0..10 {
        let v0 = random_vec(&mut rng).normalize();
        let v1 = random_vec(&mut rng).normalize();
        let path = Vec3::spher_interpolate(v0, v1, 0.05).unwrap();
        let pole = v0.cross(v1).normalize();
        let total = separation_deg(v0, v1);
        for p in &path {
            assert_relative_eq!(p.mag(), 1.0, epsilon = 1e-9);
            assert!(p.dot(pole).abs() < 1e-9);
            assert!(separation_deg(*p, v0) <= total + 1e-6);
        }
    }
}

// =============================================================================
// STATISTICS
// =============================================================================

#[test]
fn test_fisher_resultant_bounds() {
    let mut rng = StdRng::seed_from_u64(42);
    let centre = Vec3::from_polar_degrees(1.0, 35.0, 200.0);
    for n in 2..12 {
        let dirs: Vec<Vec3> = (0..n).map(|_| scattered_around(&mut rng, centre, 15.0)).collect();
        let fisher = FisherValues::calculate(&dirs).unwrap().unwrap();
        assert_eq!(fisher.n(), n);
        assert!(fisher.r() <= n as f64 + 1e-12);
        assert!(fisher.k() > 0.0);
        assert_relative_eq!(fisher.mean_direction().mag(), 1.0, epsilon = 1e-12);
        assert!(separation_deg(fisher.mean_direction(), centre) < 20.0);
    }
}

#[test]
fn test_pca_recovers_noisy_line() {
    let mut rng = StdRng::seed_from_u64(3);
    let direction = Vec3::from_polar_degrees(1.0, -20.0, 75.0);
    let steps: Vec<Vec3> = (0..10)
        .map(|i| {
            let noise = Vec3::new(
                rng.gen_range(-0.01..0.01),
                rng.gen_range(-0.01..0.01),
                rng.gen_range(-0.01..0.01),
            );
            direction * (10.0 - f64::from(i)) + noise
        })
        .collect();
    let fit = PcaFit::calculate(&steps, false).unwrap();
    assert!(separation_deg(fit.direction(), direction) < 0.5);
    assert!(fit.mad3() < 1.0);
}

#[test]
fn test_tensor_correction_preserves_eigenvalues() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..10 {
        let t = Tensor::new(
            1.0 + rng.gen_range(-0.1..0.1),
            1.0 + rng.gen_range(-0.1..0.1),
            1.0 + rng.gen_range(-0.1..0.1),
            rng.gen_range(-0.05..0.05),
            rng.gen_range(-0.05..0.05),
            rng.gen_range(-0.05..0.05),
        )
        .unwrap();
        let correction = Vec3::sample_correction_matrix(
            rng.gen_range(0.0..2.0 * PI),
            rng.gen_range(-1.0..1.0),
        )
        .unwrap();
        let corrected = t.corrected(&correction);
        for (a, b) in t.eigens().values().iter().zip(corrected.eigens().values()) {
            assert_relative_eq!(*a, b, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_location_vector_round_trip() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..20 {
        let loc = Location::from_degrees(rng.gen_range(-89.0..89.0), rng.gen_range(0.0..360.0));
        let back = Location::from_vec3(loc.to_vec3());
        assert_relative_eq!(back.lat_deg(), loc.lat_deg(), epsilon = 1e-9);
        assert_relative_eq!(back.long_deg(), loc.long_deg(), epsilon = 1e-9);
    }
}
