//! Best-fit great circles through demagnetization directions.
//!
//! A remagnetization circle is fitted by eigen-decomposing the orientation
//! tensor of the normalized directions; the minor eigenvector is the circle
//! pole. A circle remembers its points so that later analysis can ask
//! where the demagnetization path was heading.
//!
//! # Sign convention
//!
//! Angles along the circle come from [`Vec3::angle_to`], whose sign follows
//! the cross product. The fit records the overall sense in which the points
//! travel round the circle (`point_trend`), and [`GreatCircle::angle_from_last`]
//! multiplies by it. A positive angle therefore means "further along the
//! demagnetization path", whichever way the path turns.

use crate::error::{PalaeomagError, Result};
use crate::math::vector::sign_or_zero;
use crate::math::{Eigens, Vec3};

/// Minimum number of points for a plane fit.
pub const MIN_GREAT_CIRCLE_POINTS: usize = 2;

/// A great circle, fitted to points or defined by its pole.
#[derive(Debug, Clone, PartialEq)]
pub struct GreatCircle {
    pole: Vec3,
    fit: Option<CircleFit>,
}

#[derive(Debug, Clone, PartialEq)]
struct CircleFit {
    points: Vec<Vec3>,
    mad1: f64,
    point_trend: f64,
}

impl GreatCircle {
    /// Fit a great circle to a sequence of directions.
    ///
    /// # Arguments
    ///
    /// * `vectors` - Directions in demagnetization order (need not be normalized)
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two vectors are supplied or any vector
    /// is zero or not finite.
    pub fn fit(vectors: &[Vec3]) -> Result<Self> {
        if vectors.len() < MIN_GREAT_CIRCLE_POINTS {
            return Err(PalaeomagError::insufficient_data(
                MIN_GREAT_CIRCLE_POINTS,
                vectors.len(),
            ));
        }
        for v in vectors {
            v.require_direction("vector")?;
        }

        let points: Vec<Vec3> = vectors.iter().map(Vec3::normalize).collect();
        let eigens = Eigens::from_vectors(&points, true)?;
        let pole = eigens.vector(2).normalize();

        let total: f64 = points
            .windows(2)
            .map(|pair| {
                pole.nearest_on_circle(pair[0])
                    .angle_to(pole.nearest_on_circle(pair[1]))
            })
            .sum();

        Ok(Self {
            pole,
            fit: Some(CircleFit {
                points,
                mad1: eigens.mad1(),
                point_trend: sign_or_zero(total),
            }),
        })
    }

    /// Great circle with a known pole and no backing points.
    ///
    /// Point-dependent queries on the result return
    /// [`PalaeomagError::Unsupported`].
    #[must_use]
    pub fn from_pole(pole: Vec3) -> Self {
        Self { pole, fit: None }
    }

    fn require_fit(&self, operation: &str) -> Result<&CircleFit> {
        self.fit.as_ref().ok_or_else(|| {
            PalaeomagError::unsupported(format!(
                "{operation} needs a great circle fitted to points"
            ))
        })
    }

    /// Unit pole of the circle.
    #[must_use]
    pub const fn pole(&self) -> Vec3 {
        self.pole
    }

    /// True if the circle was fitted to points.
    #[must_use]
    pub const fn has_points(&self) -> bool {
        self.fit.is_some()
    }

    /// Normalized input directions.
    ///
    /// # Errors
    ///
    /// Returns an error if the circle was built from a pole alone.
    pub fn points(&self) -> Result<&[Vec3]> {
        Ok(&self.require_fit("points")?.points)
    }

    /// Planarity MAD of the fit, in degrees.
    ///
    /// # Errors
    ///
    /// Returns an error if the circle was built from a pole alone.
    pub fn mad1(&self) -> Result<f64> {
        Ok(self.require_fit("mad1")?.mad1)
    }

    /// Sense of travel of the points round the circle: 1, -1, or 0 if the
    /// net movement cancels out.
    ///
    /// # Errors
    ///
    /// Returns an error if the circle was built from a pole alone.
    pub fn point_trend(&self) -> Result<f64> {
        Ok(self.require_fit("point_trend")?.point_trend)
    }

    /// Nearest point on this circle to `v`.
    #[must_use]
    pub fn nearest_on_circle(&self, v: Vec3) -> Vec3 {
        self.pole.nearest_on_circle(v)
    }

    /// The last input direction, normalized.
    ///
    /// # Errors
    ///
    /// Returns an error if the circle was built from a pole alone.
    pub fn last_point(&self) -> Result<Vec3> {
        let fit = self.require_fit("last_point")?;
        fit.points
            .last()
            .copied()
            .ok_or_else(|| PalaeomagError::unsupported("great circle has no points"))
    }

    /// The first input direction, normalized.
    ///
    /// # Errors
    ///
    /// Returns an error if the circle was built from a pole alone.
    pub fn first_point(&self) -> Result<Vec3> {
        let fit = self.require_fit("first_point")?;
        fit.points
            .first()
            .copied()
            .ok_or_else(|| PalaeomagError::unsupported("great circle has no points"))
    }

    /// Signed angle in radians from the last point (projected onto the
    /// circle) to `v`, positive in the direction the points travel.
    ///
    /// # Errors
    ///
    /// Returns an error if the circle was built from a pole alone.
    pub fn angle_from_last(&self, v: Vec3) -> Result<f64> {
        let trend = self.point_trend()?;
        let last = self.nearest_on_circle(self.last_point()?);
        Ok(last.angle_to(v) * trend)
    }

    /// Strike in degrees of the fitted plane.
    #[must_use]
    pub fn strike_deg(&self) -> f64 {
        self.pole.strike_deg()
    }

    /// Dip in degrees of the fitted plane.
    #[must_use]
    pub fn dip_deg(&self) -> f64 {
        self.pole.dip_deg()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_4;

    fn quarter_arc() -> GreatCircle {
        GreatCircle::fit(&[
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_horizontal_points_give_vertical_pole() {
        let gc = quarter_arc();
        assert_relative_eq!(gc.pole().z.abs(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(gc.mad1().unwrap(), 0.0, epsilon = 1e-6);
        assert_relative_eq!(gc.dip_deg(), 0.0, epsilon = 1e-6);
        assert_eq!(gc.point_trend().unwrap(), 1.0);
    }

    #[test]
    fn test_angle_from_last() {
        let gc = quarter_arc();
        assert_relative_eq!(gc.angle_from_last(Vec3::new(0.0, 1.0, 0.0)).unwrap(), 0.0, epsilon = 1e-6);
        // Back along the path towards the first point.
        assert_relative_eq!(
            gc.angle_from_last(Vec3::new(1.0, 1.0, 0.0).normalize()).unwrap(),
            -FRAC_PI_4,
            epsilon = 1e-9
        );
        // Onwards, past the last point.
        assert_relative_eq!(
            gc.angle_from_last(Vec3::new(-1.0, 1.0, 0.0).normalize()).unwrap(),
            FRAC_PI_4,
            epsilon = 1e-9
        );
        let thirty = Vec3::from_polar_degrees(1.0, 0.0, 120.0);
        assert_relative_eq!(
            gc.angle_from_last(thirty).unwrap(),
            30f64.to_radians(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_reversed_path_flips_trend() {
        let gc = GreatCircle::fit(&[
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(gc.point_trend().unwrap(), -1.0);
        // Continuing past the last point is still a positive angle.
        let beyond = Vec3::new(1.0, -0.5, 0.0).normalize();
        assert!(gc.angle_from_last(beyond).unwrap() > 0.0);
    }

    #[test]
    fn test_points_are_normalized_copies() {
        let inputs = [Vec3::new(2.0, 0.0, 1.0), Vec3::new(0.0, 3.0, 1.0), Vec3::new(-1.0, 1.0, 0.5)];
        let gc = GreatCircle::fit(&inputs).unwrap();
        let expected: Vec<Vec3> = inputs.iter().map(Vec3::normalize).collect();
        assert_eq!(gc.points().unwrap(), expected.as_slice());
        assert_eq!(gc.last_point().unwrap(), inputs[2].normalize());
        assert_eq!(gc.first_point().unwrap(), inputs[0].normalize());
    }

    #[test]
    fn test_pole_only_circle() {
        let gc = GreatCircle::from_pole(Vec3::NORTH);
        assert_eq!(gc.pole(), Vec3::NORTH);
        assert!(!gc.has_points());
        assert!(matches!(gc.last_point(), Err(PalaeomagError::Unsupported(_))));
        assert!(matches!(gc.angle_from_last(Vec3::EAST), Err(PalaeomagError::Unsupported(_))));
        assert!(matches!(gc.mad1(), Err(PalaeomagError::Unsupported(_))));
        assert_relative_eq!(gc.nearest_on_circle(Vec3::new(1.0, 1.0, 0.0).normalize()).y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        assert!(GreatCircle::fit(&[Vec3::NORTH]).is_err());
        assert!(GreatCircle::fit(&[Vec3::NORTH, Vec3::ORIGIN]).is_err());
    }
}
