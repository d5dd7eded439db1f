//! Combined mean of remagnetization circles and stable endpoints.
//!
//! Implements the iterative method of McFadden & McElhinny (1988). Each
//! circle contributes the point on it nearest the current mean estimate,
//! and the estimate is refined until no contributed point moves by more
//! than the configured stability limit.

use crate::config::StatsConfig;
use crate::error::{PalaeomagError, Result};
use crate::fisher::FisherParams;
use crate::great_circle::GreatCircle;
use crate::math::Vec3;
use tracing::{debug, warn};

/// Mean direction of great circles and endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct GreatCirclesMean {
    circles: Vec<GreatCircle>,
    endpoints: Vec<Vec3>,
    guide_points: Vec<Vec3>,
    direction: Vec3,
    a95: f64,
    k: f64,
    r: f64,
    min_points: usize,
    iterations: usize,
    converged: bool,
}

impl GreatCirclesMean {
    /// Combined mean with the default configuration.
    ///
    /// # Arguments
    ///
    /// * `endpoints` - Stable endpoint directions (need not be normalized)
    /// * `circles` - Great circles fitted to demagnetization paths
    ///
    /// # Errors
    ///
    /// Returns an error if there are no endpoints and fewer than two
    /// circles, if an endpoint is zero or not finite, or if a circle was
    /// built from a pole alone.
    pub fn calculate(endpoints: &[Vec3], circles: &[GreatCircle]) -> Result<Self> {
        Self::calculate_with_config(endpoints, circles, &StatsConfig::default())
    }

    /// Combined mean with explicit iteration and confidence settings.
    ///
    /// # Errors
    ///
    /// As [`GreatCirclesMean::calculate`], or if the configuration is invalid.
    pub fn calculate_with_config(
        endpoints: &[Vec3],
        circles: &[GreatCircle],
        config: &StatsConfig,
    ) -> Result<Self> {
        config.validate()?;
        if endpoints.is_empty() && circles.len() < 2 {
            return Err(PalaeomagError::invalid_input(format!(
                "need at least one endpoint or two circles, got {} endpoints and {} circles",
                endpoints.len(),
                circles.len()
            )));
        }
        for e in endpoints {
            e.require_direction("endpoint")?;
        }

        let mut min_points = if circles.is_empty() { 0 } else { usize::MAX };
        for circle in circles {
            min_points = min_points.min(circle.points()?.len());
        }

        let mut fixed: Vec<Vec3> = endpoints.iter().map(Vec3::normalize).collect();
        let seeded = fixed.is_empty();
        if seeded {
            // Start from the net direction in which the paths travel.
            let mut guess = Vec3::ORIGIN;
            for circle in circles {
                guess = guess + (circle.last_point()? - circle.first_point()?);
            }
            fixed.push(guess.normalize());
        }

        let mut guide = vec![Vec3::ORIGIN; circles.len()];
        let mut converged = false;
        let mut iterations = 0;
        while iterations < config.great_circles_max_iterations && !converged {
            converged = iterations > 0;
            for (i, circle) in circles.iter().enumerate() {
                let old = guide[i];
                guide[i] = Vec3::ORIGIN;
                let estimate = (fixed.iter().copied().sum::<Vec3>()
                    + guide.iter().copied().sum::<Vec3>())
                .normalize();
                let new = circle.nearest_on_circle(estimate);
                guide[i] = new;
                if iterations > 0 && new.dot(old).min(1.0).acos() > config.great_circles_stable_limit {
                    converged = false;
                }
            }
            if iterations == 0 && seeded {
                fixed.clear();
            }
            iterations += 1;
        }
        if circles.is_empty() {
            converged = true;
        }

        if converged {
            debug!(iterations, "great-circle mean converged");
        } else {
            warn!(iterations, "great-circle mean did not converge within the iteration cap");
        }

        let sum = fixed.iter().copied().sum::<Vec3>() + guide.iter().copied().sum::<Vec3>();
        let r = sum.mag();
        let m = endpoints.len() as f64;
        let n = circles.len() as f64;
        let k = (2.0 * m + n - 2.0) / (2.0 * (m + n - r));

        let nn = m + n / 2.0;
        let p = config.significance();
        let a95 = (1.0 - ((nn - 1.0) / (k * r)) * ((1.0 / p).powf(1.0 / (nn - 1.0)) - 1.0))
            .acos()
            .to_degrees();
        debug!(m, n, nn, k, r, a95, "great-circle mean statistics");

        Ok(Self {
            circles: circles.to_vec(),
            endpoints: endpoints.to_vec(),
            guide_points: guide,
            direction: sum.normalize(),
            a95,
            k,
            r,
            min_points,
            iterations,
            converged,
        })
    }

    /// Number of stable endpoints (M).
    #[must_use]
    pub fn m(&self) -> usize {
        self.endpoints.len()
    }

    /// The circles supplied to the calculation.
    #[must_use]
    pub fn circles(&self) -> &[GreatCircle] {
        &self.circles
    }

    /// The endpoints supplied to the calculation, as given.
    #[must_use]
    pub fn endpoints(&self) -> &[Vec3] {
        &self.endpoints
    }

    /// Point on each circle nearest the final mean, in circle order.
    #[must_use]
    pub fn guide_points(&self) -> &[Vec3] {
        &self.guide_points
    }

    /// Fewest points in any of the circles, or 0 if there are no circles.
    #[must_use]
    pub const fn min_points(&self) -> usize {
        self.min_points
    }

    /// Number of passes made over the circles.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    /// False if the iteration cap was reached before the guide points settled.
    #[must_use]
    pub const fn converged(&self) -> bool {
        self.converged
    }
}

impl FisherParams for GreatCirclesMean {
    fn mean_direction(&self) -> Vec3 {
        self.direction
    }

    fn a95(&self) -> f64 {
        self.a95
    }

    fn k(&self) -> f64 {
        self.k
    }

    /// Number of great circles (N).
    fn n(&self) -> usize {
        self.circles.len()
    }

    fn r(&self) -> f64 {
        self.r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Circle through `target` and `start`, sampled from `start` towards `target`.
    fn path(start: Vec3, target: Vec3, steps: usize) -> GreatCircle {
        let points: Vec<Vec3> = (0..steps)
            .map(|i| {
                let t = i as f64 / steps as f64;
                (start * (1.0 - t) + target * t).normalize()
            })
            .collect();
        GreatCircle::fit(&points).unwrap()
    }

    fn target() -> Vec3 {
        Vec3::from_polar_degrees(1.0, 50.0, 20.0)
    }

    #[test]
    fn test_requires_enough_data() {
        let c = path(Vec3::NORTH, target(), 4);
        assert!(GreatCirclesMean::calculate(&[], &[c]).is_err());
        assert!(GreatCirclesMean::calculate(&[], &[]).is_err());
        assert!(GreatCirclesMean::calculate(&[target()], &[]).is_ok());
        let pole_only = GreatCircle::from_pole(Vec3::DOWN);
        assert!(matches!(
            GreatCirclesMean::calculate(&[target()], &[pole_only]),
            Err(PalaeomagError::Unsupported(_))
        ));
    }

    #[test]
    fn test_intersecting_circles_find_common_point() {
        let circles = vec![
            path(Vec3::NORTH, target(), 5),
            path(Vec3::EAST, target(), 6),
            path(Vec3::from_polar_degrees(1.0, -10.0, 250.0), target(), 4),
        ];
        let mean = GreatCirclesMean::calculate(&[], &circles).unwrap();
        assert!(mean.converged());
        assert_eq!(mean.m(), 0);
        assert_eq!(mean.n(), 3);
        assert_eq!(mean.min_points(), 4);
        assert_relative_eq!(mean.mean_direction().dot(target()), 1.0, epsilon = 1e-3);
        assert_eq!(mean.guide_points().len(), 3);
        for g in mean.guide_points() {
            assert_relative_eq!(g.mag(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_endpoints_and_circles() {
        let circles = vec![path(Vec3::NORTH, target(), 5), path(Vec3::EAST, target(), 5)];
        let endpoints = vec![target() * 2.0, Vec3::from_polar_degrees(1.0, 52.0, 22.0)];
        let mean = GreatCirclesMean::calculate(&endpoints, &circles).unwrap();
        assert_eq!(mean.m(), 2);
        assert_eq!(mean.endpoints(), endpoints.as_slice());
        assert!(mean.mean_direction().angle_to(target()).abs() < 3f64.to_radians());
        assert!(mean.r() <= 4.0 + 1e-12);
        assert!(mean.k() > 0.0);
        assert!(mean.is_a95_valid());
    }

    #[test]
    fn test_endpoints_only_matches_fisher_resultant() {
        let endpoints = [Vec3::new(1.0, 0.1, 0.2), Vec3::new(1.0, -0.1, 0.1), Vec3::new(0.9, 0.0, 0.3)];
        let mean = GreatCirclesMean::calculate(&endpoints, &[]).unwrap();
        let expected: Vec3 = endpoints.iter().map(Vec3::normalize).sum();
        assert_relative_eq!(mean.r(), expected.mag(), epsilon = 1e-12);
        assert_relative_eq!(mean.mean_direction().dot(expected.normalize()), 1.0, epsilon = 1e-12);
        assert_eq!(mean.min_points(), 0);
        // With no circles k reduces to the Fisher estimate (N - 1)/(N - R).
        assert_relative_eq!(mean.k(), 2.0 / (3.0 - expected.mag()), epsilon = 1e-10);
    }

    #[test]
    fn test_iteration_cap() {
        let circles = vec![
            path(Vec3::NORTH, target(), 5),
            path(Vec3::EAST, target(), 5),
            path(Vec3::DOWN, Vec3::from_polar_degrees(1.0, 10.0, 200.0), 5),
        ];
        let config = StatsConfig::default().with_great_circles_max_iterations(1);
        let mean = GreatCirclesMean::calculate_with_config(&[], &circles, &config).unwrap();
        assert_eq!(mean.iterations(), 1);
        assert!(!mean.converged());
    }
}
