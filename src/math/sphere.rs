//! Great-circle, small-circle and interpolation geometry on the unit sphere.
//!
//! These routines feed equal-area plots: paths between directions are
//! interpolated along great circles and split wherever they cross the
//! equator, since upper- and lower-hemisphere segments are drawn
//! differently. Several inputs have no unique answer (antipodal endpoints,
//! vertical vectors, a point at the pole of a circle). Each of those cases
//! resolves to a fixed, documented choice so that repeated runs give
//! identical coordinates.

use super::vector::{plane_correction_matrix, require_finite, sign_or_zero, MeasurementAxis, Vec3};
use crate::error::{PalaeomagError, Result};
use std::f64::consts::{FRAC_PI_2, PI};

/// Dot product beyond which a point counts as lying on a circle's pole.
const POLE_DOT_LIMIT: f64 = 1.0 - 1e-12;

fn require_step_size(step_size: f64) -> Result<()> {
    if step_size.is_finite() && step_size > 0.0 && step_size < 2.0 * PI {
        Ok(())
    } else {
        Err(PalaeomagError::invalid_input(format!(
            "step size must be between 0 and 2π, but {step_size} was passed"
        )))
    }
}

/// Join two paths that share an end point, keeping one copy of it.
fn concatenate_without_centre(mut first: Vec<Vec3>, second: Vec<Vec3>) -> Vec<Vec3> {
    first.extend(second.into_iter().skip(1));
    first
}

impl Vec3 {
    /// Point where the great circle through `v0` and `v1` meets the equator.
    ///
    /// The vectors must lie in opposite hemispheres or on the equator. A
    /// vector already on the equator is returned as it is. Two vertical
    /// vectors give north; two antipodal vectors give the horizontal
    /// projection of `v0`.
    ///
    /// # Errors
    ///
    /// Returns an error if either vector is not finite or both lie strictly
    /// in the same hemisphere.
    pub fn equator_point(v0: Self, v1: Self) -> Result<Self> {
        v0.require_finite("v0")?;
        v1.require_finite("v1")?;

        if (v0.z > 0.0 && v1.z > 0.0) || (v0.z < 0.0 && v1.z < 0.0) {
            return Err(PalaeomagError::SameHemisphere);
        }
        if v0.z == 0.0 {
            return Ok(v0);
        }
        if v1.z == 0.0 {
            return Ok(v1);
        }
        if v0.x == 0.0 && v0.y == 0.0 && v1.x == 0.0 && v1.y == 0.0 {
            return Ok(Self::NORTH);
        }
        if v0 + v1 == Self::ORIGIN {
            return Ok(Self::new(v0.x, v0.y, 0.0).normalize());
        }

        // Scale both vectors to unit |z| so their sum cancels the vertical.
        Ok((v0 * (sign_or_zero(v0.z) / v0.z) + v1 * (sign_or_zero(v1.z) / v1.z)).normalize())
    }

    /// True if both vectors have the same sign of z.
    ///
    /// Vectors exactly on the equator form their own hemisphere.
    #[must_use]
    pub fn same_hemisphere(&self, v: Self) -> bool {
        sign_or_zero(self.z) == sign_or_zero(v.z)
    }

    /// Split a path into single-hemisphere segments.
    ///
    /// At each hemisphere change the equator crossing is appended to the
    /// current segment and also starts the next one.
    ///
    /// # Errors
    ///
    /// Returns an error if any vector is not finite.
    pub fn interpolate_equator_points(vs: &[Self]) -> Result<Vec<Vec<Self>>> {
        let mut result = Vec::new();
        let mut segment: Vec<Self> = Vec::new();
        let mut prev: Option<Self> = None;

        for &v in vs {
            v.require_finite("v")?;
            match prev {
                Some(p) if !p.same_hemisphere(v) => {
                    let between = Self::equator_point(p, v)?;
                    segment.push(between);
                    result.push(std::mem::take(&mut segment));
                    segment.push(between);
                    segment.push(v);
                }
                _ => segment.push(v),
            }
            prev = Some(v);
        }
        if !segment.is_empty() {
            result.push(segment);
        }
        Ok(result)
    }

    /// Evenly spaced unit vectors along the shorter great-circle arc from
    /// `v0` to `v1`.
    ///
    /// Uses spherical linear interpolation. Parallel inputs give a single
    /// point. Antiparallel inputs are routed through north, or through east
    /// when the inputs are themselves close to the north axis. The end point
    /// is appended once more after the interpolated run, so the final two
    /// points coincide when the arc is longer than one step.
    ///
    /// # Arguments
    ///
    /// * `v0` - Start direction (need not be normalized)
    /// * `v1` - End direction (need not be normalized)
    /// * `step_size` - Nominal angular step in radians, in `(0, 2π)`; the arc
    ///   is divided into whole steps no shorter than this
    ///
    /// # Errors
    ///
    /// Returns an error if either vector is zero or not finite, or if the
    /// step size is out of range.
    pub fn spher_interpolate(v0: Self, v1: Self, step_size: f64) -> Result<Vec<Self>> {
        v0.require_direction("v0")?;
        v1.require_direction("v1")?;
        require_step_size(step_size)?;

        let v0n = v0.normalize();
        let v1n = v1.normalize();
        let dot = v0n.dot(v1n);

        if dot >= 1.0 {
            return Ok(vec![v0n]);
        }
        if dot <= -1.0 {
            let via = if v0n.dot(Self::NORTH).abs() < 0.99 {
                Self::NORTH
            } else {
                Self::EAST
            };
            return Ok(concatenate_without_centre(
                Self::spher_interpolate(v0, via, step_size)?,
                Self::spher_interpolate(via, v1, step_size)?,
            ));
        }

        let omega = dot.acos();
        if omega < step_size {
            return Ok(vec![v0n, v1n]);
        }
        let steps = (omega / step_size) as usize + 1;
        let sin_omega = omega.sin();
        let mut result = Vec::with_capacity(steps + 1);
        for i in 0..steps {
            let t = i as f64 / (steps - 1) as f64;
            let scale0 = ((1.0 - t) * omega).sin() / sin_omega;
            let scale1 = (t * omega).sin() / sin_omega;
            result.push(v0n * scale0 + v1n * scale1);
        }
        result.push(v1n);
        Ok(result)
    }

    /// Interpolate from `v0` to `v1` along whichever great-circle path lies
    /// on the same side as `on_path`.
    ///
    /// When the short arc does not head towards `on_path` the long way round
    /// is taken, built from three short arcs through the antipodes of the
    /// endpoints. For antipodal endpoints `on_path` is used as the midpoint
    /// unless it coincides with an endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if any vector is zero or not finite, or if the step
    /// size is out of range.
    pub fn spher_interp_dir(v0: Self, v1: Self, on_path: Self, step_size: f64) -> Result<Vec<Self>> {
        v0.require_direction("v0")?;
        v1.require_direction("v1")?;
        on_path.require_direction("on_path")?;
        require_step_size(step_size)?;

        if v0 == v1 {
            return Ok(vec![v0]);
        }
        if v0 == v1.invert() {
            if v0 == on_path || v1 == on_path {
                return Self::spher_interpolate(v0, v1, step_size);
            }
            return Ok(concatenate_without_centre(
                Self::spher_interpolate(v0, on_path, step_size)?,
                Self::spher_interpolate(on_path, v1, step_size)?,
            ));
        }

        let avg_dir = (v0 + v1).normalize();
        if avg_dir.dot(on_path) > 0.0 {
            return Self::spher_interpolate(v0, v1, step_size);
        }
        let mut result = Self::spher_interpolate(v0, v1.invert(), step_size)?;
        result.extend(Self::spher_interpolate(v1.invert(), v0.invert(), step_size)?);
        result.extend(Self::spher_interpolate(v0.invert(), v1, step_size)?);
        Ok(result)
    }

    /// Nearest point to `v` on the great circle whose pole is this vector.
    ///
    /// Both vectors are assumed to be unit vectors. If `v` lies on the pole
    /// every point of the circle is equally near; the point nearest north is
    /// returned, or the point nearest east when north is itself the pole.
    #[must_use]
    pub fn nearest_on_circle(&self, v: Self) -> Self {
        let tau = self.dot(v);
        if tau.abs() >= POLE_DOT_LIMIT {
            let fallback = if self.dot(Self::NORTH).abs() < POLE_DOT_LIMIT {
                Self::NORTH
            } else {
                Self::EAST
            };
            return self.nearest_on_circle(fallback);
        }
        let rho = (1.0 - tau * tau).sqrt();
        (v - *self * tau) / rho
    }

    /// `n` evenly spaced points on the great circle whose pole is this vector.
    ///
    /// # Arguments
    ///
    /// * `n` - Number of distinct points
    /// * `closed` - Append the first point again to close the loop
    ///
    /// # Errors
    ///
    /// Returns an error if `n` is zero or this vector is not finite.
    pub fn great_circle_points(&self, n: usize, closed: bool) -> Result<Vec<Self>> {
        if n < 1 {
            return Err(PalaeomagError::invalid_input(
                "number of great-circle points must be at least 1",
            ));
        }
        self.require_finite("pole")?;
        let mut points: Vec<Self> = (0..n)
            .map(|i| self.correct_tilt(Self::from_polar_radians(1.0, 0.0, 2.0 * PI * i as f64 / n as f64)))
            .collect();
        if closed {
            points.push(points[0]);
        }
        Ok(points)
    }

    /// Rotate `v` so that the vertical maps onto this vector as a plane pole.
    fn correct_tilt(&self, v: Self) -> Self {
        let d = self.x.hypot(self.y);
        if d == 0.0 {
            if self.z < 0.0 {
                v
            } else {
                v.rot180(MeasurementAxis::X)
            }
        } else {
            v.transform(&plane_correction_matrix(d, self.y / d, self.z, self.x / d))
        }
    }

    /// Closed small circle of angular radius `radius_deg` about this vector,
    /// with points every 5° of azimuth.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius or this vector is not finite.
    pub fn small_circle(&self, radius_deg: f64) -> Result<Vec<Self>> {
        self.small_circle_with_step(radius_deg, 5.0)
    }

    /// Closed small circle of angular radius `radius_deg` about this vector.
    ///
    /// # Arguments
    ///
    /// * `radius_deg` - Angular radius in degrees
    /// * `step_deg` - Azimuthal spacing of the points in degrees, in `(0, 360)`
    ///
    /// # Errors
    ///
    /// Returns an error if an argument is out of range or this vector is not
    /// finite.
    pub fn small_circle_with_step(&self, radius_deg: f64, step_deg: f64) -> Result<Vec<Self>> {
        require_finite(radius_deg, "radius")?;
        if !(step_deg > 0.0 && step_deg < 360.0) {
            return Err(PalaeomagError::invalid_input(format!(
                "small-circle step must be between 0 and 360 degrees, but {step_deg} was passed"
            )));
        }
        self.require_finite("axis")?;
        let tilt = FRAC_PI_2 - self.inc_rad();
        let turn = self.dec_rad();
        let count = (360.0 / step_deg).ceil() as usize;
        let mut points = Vec::with_capacity(count + 1);
        for i in 0..count {
            let dec = i as f64 * step_deg;
            let v = Self::from_polar_degrees(1.0, 90.0 - radius_deg, dec);
            points.push(v.rot_y(tilt)?.rot_z(turn)?);
        }
        points.push(points[0]);
        Ok(points)
    }
}
