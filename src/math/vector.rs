//! Cartesian three-vector with palaeomagnetic polar conventions.
//!
//! Axes follow the usual palaeomagnetic frame: x points north, y east and
//! z down. Inclination is positive downwards and declination is measured
//! clockwise from north when viewed from above.
//!
//! # Rotations
//!
//! | Method | Effect |
//! |--------|--------|
//! | [`Vec3::rot_z`] | rotation about the vertical, clockwise viewed from above |
//! | [`Vec3::rot_y`] | rotation about the east axis |
//! | [`Vec3::rot180`] | half turn about a measurement axis |
//! | [`Vec3::correct_sample`] | sample frame to geographic frame |
//! | [`Vec3::correct_form`] | geographic frame to tectonic frame |

use crate::error::{PalaeomagError, Result};
use nalgebra::{Matrix3, Vector3};
use std::f64::consts::PI;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Axis labels used by instruments and rotation helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MeasurementAxis {
    /// North.
    X,
    /// South.
    MinusX,
    /// East.
    Y,
    /// West.
    MinusY,
    /// Down.
    Z,
    /// Up.
    MinusZ,
    /// Horizontal magnitude.
    H,
}

/// Immutable three-dimensional Cartesian vector.
///
/// Every operation returns a new value. Exact equality (`==`) compares the
/// three components; [`Vec3::is_close`] compares with a relative tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    /// North component.
    pub x: f64,
    /// East component.
    pub y: f64,
    /// Down component.
    pub z: f64,
}

/// Sign function returning zero for zero (and for NaN).
#[inline]
pub(crate) fn sign_or_zero(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Fail with a non-finite error unless `value` is finite.
#[inline]
pub(crate) fn require_finite(value: f64, name: &str) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PalaeomagError::non_finite(format!("{name} = {value}")))
    }
}

impl Vec3 {
    /// The zero vector.
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);
    /// Unit vector pointing north.
    pub const NORTH: Self = Self::new(1.0, 0.0, 0.0);
    /// Unit vector pointing east.
    pub const EAST: Self = Self::new(0.0, 1.0, 0.0);
    /// Unit vector pointing down.
    pub const DOWN: Self = Self::new(0.0, 0.0, 1.0);

    /// Create a vector from Cartesian components.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Create a vector from magnitude, inclination and declination in radians.
    #[must_use]
    pub fn from_polar_radians(mag: f64, inc: f64, dec: f64) -> Self {
        Self::new(
            mag * inc.cos() * dec.cos(),
            mag * inc.cos() * dec.sin(),
            mag * inc.sin(),
        )
    }

    /// Create a vector from magnitude, inclination and declination in degrees.
    #[must_use]
    pub fn from_polar_degrees(mag: f64, inc: f64, dec: f64) -> Self {
        Self::from_polar_radians(mag, inc.to_radians(), dec.to_radians())
    }

    /// Copy of this vector with a new x component.
    #[must_use]
    pub const fn with_x(self, x: f64) -> Self {
        Self::new(x, self.y, self.z)
    }

    /// Copy of this vector with a new y component.
    #[must_use]
    pub const fn with_y(self, y: f64) -> Self {
        Self::new(self.x, y, self.z)
    }

    /// Copy of this vector with a new z component.
    #[must_use]
    pub const fn with_z(self, z: f64) -> Self {
        Self::new(self.x, self.y, z)
    }

    /// True if no component is NaN or infinite.
    #[must_use]
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Euclidean length.
    #[must_use]
    #[inline]
    pub fn mag(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Scalar product.
    #[must_use]
    #[inline]
    pub fn dot(&self, v: Self) -> f64 {
        self.x * v.x + self.y * v.y + self.z * v.z
    }

    /// Vector product.
    #[must_use]
    #[inline]
    pub fn cross(&self, v: Self) -> Self {
        Self::new(
            self.y * v.z - self.z * v.y,
            self.z * v.x - self.x * v.z,
            self.x * v.y - self.y * v.x,
        )
    }

    /// Unit vector in the same direction.
    ///
    /// No checks are made: the zero vector or a non-finite vector produce
    /// non-finite components rather than an error.
    #[must_use]
    #[inline]
    pub fn normalize(&self) -> Self {
        let m = self.mag();
        Self::new(self.x / m, self.y / m, self.z / m)
    }

    /// Vector pointing the opposite way.
    #[must_use]
    #[inline]
    pub fn invert(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }

    /// Element-wise product.
    #[must_use]
    pub fn hadamard(&self, v: Self) -> Self {
        Self::new(self.x * v.x, self.y * v.y, self.z * v.z)
    }

    /// Element-wise quotient.
    #[must_use]
    pub fn hadamard_div(&self, v: Self) -> Self {
        Self::new(self.x / v.x, self.y / v.y, self.z / v.z)
    }

    /// Component along a measurement axis.
    ///
    /// [`MeasurementAxis::H`] gives the horizontal magnitude.
    #[must_use]
    pub fn component(&self, axis: MeasurementAxis) -> f64 {
        match axis {
            MeasurementAxis::X => self.x,
            MeasurementAxis::MinusX => -self.x,
            MeasurementAxis::Y => self.y,
            MeasurementAxis::MinusY => -self.y,
            MeasurementAxis::Z => self.z,
            MeasurementAxis::MinusZ => -self.z,
            MeasurementAxis::H => self.x.hypot(self.y),
        }
    }

    /// Inclination in radians, in `[-π/2, π/2]`.
    #[must_use]
    pub fn inc_rad(&self) -> f64 {
        self.z.atan2(self.x.hypot(self.y))
    }

    /// Declination in radians, in `[0, 2π)`.
    #[must_use]
    pub fn dec_rad(&self) -> f64 {
        let theta = self.y.atan2(self.x);
        if theta < 0.0 {
            theta + 2.0 * PI
        } else {
            theta
        }
    }

    /// Inclination in degrees.
    #[must_use]
    pub fn inc_deg(&self) -> f64 {
        self.inc_rad().to_degrees()
    }

    /// Declination in degrees.
    #[must_use]
    pub fn dec_deg(&self) -> f64 {
        self.dec_rad().to_degrees()
    }

    /// Strike in degrees of the plane whose pole is this vector.
    ///
    /// Uses the right-hand rule on the upward-pointing pole.
    #[must_use]
    pub fn strike_deg(&self) -> f64 {
        let mut dec = self.dec_deg();
        if self.inc_deg() > 0.0 {
            dec += 180.0;
        }
        (dec - 90.0).rem_euclid(360.0)
    }

    /// Dip in degrees of the plane whose pole is this vector.
    #[must_use]
    pub fn dip_deg(&self) -> f64 {
        90.0 - self.inc_deg().abs()
    }

    /// Half-turn about a measurement axis.
    ///
    /// Only X, Y and Z define a rotation; every other axis returns the
    /// vector unchanged.
    #[must_use]
    pub fn rot180(&self, axis: MeasurementAxis) -> Self {
        match axis {
            MeasurementAxis::X => Self::new(self.x, -self.y, -self.z),
            MeasurementAxis::Y => Self::new(-self.x, self.y, -self.z),
            MeasurementAxis::Z => Self::new(-self.x, -self.y, self.z),
            _ => *self,
        }
    }

    /// Rotate about the y (east) axis.
    ///
    /// # Errors
    ///
    /// Returns an error if `angle` is not finite.
    pub fn rot_y(&self, angle: f64) -> Result<Self> {
        require_finite(angle, "angle")?;
        let (s, c) = angle.sin_cos();
        Ok(Self::new(
            c * self.x + s * self.z,
            self.y,
            -s * self.x + c * self.z,
        ))
    }

    /// Rotate about the z (down) axis, clockwise when viewed from above.
    ///
    /// # Errors
    ///
    /// Returns an error if `angle` is not finite.
    pub fn rot_z(&self, angle: f64) -> Result<Self> {
        require_finite(angle, "angle")?;
        Ok(self.transform(&Self::z_rotation_matrix(angle)))
    }

    /// Add `angle` radians to the declination, keeping the inclination.
    ///
    /// # Errors
    ///
    /// Returns an error if `angle` is not finite.
    pub fn add_dec_rad(&self, angle: f64) -> Result<Self> {
        self.rot_z(angle)
    }

    /// Add `angle` radians to the inclination, keeping the declination.
    ///
    /// The vector is tilted within its own vertical plane, so a vector
    /// with no horizontal component has no defined result.
    ///
    /// # Errors
    ///
    /// Returns an error if `angle` is not finite.
    pub fn add_inc_rad(&self, angle: f64) -> Result<Self> {
        require_finite(angle, "angle")?;
        let h = self.x.hypot(self.y);
        let sini = -angle.sin();
        let cosi = angle.cos();
        let sind = self.y / h;
        let cosd = self.x / h;
        let m = Matrix3::new(
            cosd * cosi * cosd + sind * sind,
            cosi * sind * cosd - sind * cosd,
            sini * cosd,
            sind * cosi * cosd - cosd * sind,
            cosi * sind * sind + cosd * cosd,
            sini * sind,
            -cosd * sini,
            -sind * sini,
            cosi,
        );
        Ok(self.transform(&m))
    }

    /// Matrix for a clockwise rotation about z.
    #[must_use]
    pub fn z_rotation_matrix(angle: f64) -> Matrix3<f64> {
        let (s, c) = angle.sin_cos();
        Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
    }

    /// Combined matrix taking sample coordinates to geographic coordinates.
    ///
    /// Equivalent to `rot_y(π/2 - dip)` followed by `rot_z(az)`.
    ///
    /// # Errors
    ///
    /// Returns an error if either angle is not finite.
    pub fn sample_correction_matrix(az: f64, dip: f64) -> Result<Matrix3<f64>> {
        require_finite(az, "az")?;
        require_finite(dip, "dip")?;
        let (sa, ca) = az.sin_cos();
        let (sd, cd) = dip.sin_cos();
        Ok(Matrix3::new(
            sd * ca,
            -sa,
            cd * ca,
            sd * sa,
            ca,
            cd * sa,
            -cd,
            0.0,
            sd,
        ))
    }

    /// Combined matrix taking geographic coordinates to tectonic coordinates.
    ///
    /// Equivalent to `rot_z(-az)`, `rot_y(dip)`, `rot_z(az)` in sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if either angle is not finite.
    pub fn formation_correction_matrix(az: f64, dip: f64) -> Result<Matrix3<f64>> {
        require_finite(az, "az")?;
        require_finite(dip, "dip")?;
        Ok(plane_correction_matrix(dip.sin(), az.sin(), dip.cos(), az.cos()))
    }

    /// Rotate from the sample frame into the geographic frame.
    ///
    /// # Arguments
    ///
    /// * `az` - Sample azimuth in radians
    /// * `dip` - Sample dip in radians
    ///
    /// # Errors
    ///
    /// Returns an error if either angle is not finite.
    pub fn correct_sample(&self, az: f64, dip: f64) -> Result<Self> {
        Ok(self.transform(&Self::sample_correction_matrix(az, dip)?))
    }

    /// Rotate from the geographic frame into the tectonic frame.
    ///
    /// `correct_form(az + π, dip)` undoes `correct_form(az, dip)`.
    ///
    /// # Arguments
    ///
    /// * `az` - Dip azimuth of the bedding in radians
    /// * `dip` - Bedding dip in radians
    ///
    /// # Errors
    ///
    /// Returns an error if either angle is not finite.
    pub fn correct_form(&self, az: f64, dip: f64) -> Result<Self> {
        Ok(self.transform(&Self::formation_correction_matrix(az, dip)?))
    }

    /// Multiply by a matrix, treating this vector as a column.
    #[must_use]
    #[inline]
    pub fn transform(&self, m: &Matrix3<f64>) -> Self {
        Self::from(m * Vector3::from(*self))
    }

    /// Outer product `v vᵀ`.
    #[must_use]
    pub fn outer(&self) -> Matrix3<f64> {
        let v = Vector3::from(*self);
        v * v.transpose()
    }

    /// Signed angle to `v` in radians.
    ///
    /// The magnitude comes from the cross product (clamped to 1 before the
    /// arcsine), so it is only meaningful for unit vectors less than a
    /// right angle apart. The sign is that of the first non-zero cross
    /// product component, checked in the order z, y, x.
    #[must_use]
    pub fn angle_to(&self, v: Self) -> f64 {
        let cross = self.cross(v);
        let mut sign = sign_or_zero(cross.z);
        if sign == 0.0 {
            sign = sign_or_zero(cross.y);
        }
        if sign == 0.0 {
            sign = sign_or_zero(cross.x);
        }
        cross.mag().min(1.0).asin() * sign
    }

    /// Euclidean distance to `v`.
    ///
    /// # Errors
    ///
    /// Returns an error if `v` is not finite.
    pub fn distance(&self, v: Self) -> Result<f64> {
        v.require_finite("v")?;
        Ok((*self - v).mag())
    }

    /// Approximate equality relative to the larger magnitude.
    ///
    /// Two zero vectors are always close.
    ///
    /// # Errors
    ///
    /// Returns an error if `precision` is negative or not finite, or if `v`
    /// is not finite.
    pub fn is_close(&self, v: Self, precision: f64) -> Result<bool> {
        require_finite(precision, "precision")?;
        if precision < 0.0 {
            return Err(PalaeomagError::invalid_input(format!(
                "precision = {precision} is negative"
            )));
        }
        v.require_finite("v")?;
        let mag0 = self.mag();
        let mag1 = v.mag();
        if mag0 == 0.0 && mag1 == 0.0 {
            return Ok(true);
        }
        Ok(self.distance(v)? < mag0.max(mag1) * precision)
    }

    /// Arithmetic mean of a set of vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if `vectors` is empty.
    pub fn mean(vectors: &[Self]) -> Result<Self> {
        if vectors.is_empty() {
            return Err(PalaeomagError::insufficient_data(1, 0));
        }
        Ok(vectors.iter().copied().sum::<Self>() / vectors.len() as f64)
    }

    /// Unit vector along the sum of a set of vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if `vectors` is empty.
    pub fn mean_direction(vectors: &[Self]) -> Result<Self> {
        if vectors.is_empty() {
            return Err(PalaeomagError::insufficient_data(1, 0));
        }
        Ok(vectors.iter().copied().sum::<Self>().normalize())
    }

    pub(crate) fn require_finite(&self, name: &str) -> Result<()> {
        if self.is_finite() {
            Ok(())
        } else {
            Err(PalaeomagError::non_finite(format!("{name} = {self}")))
        }
    }

    /// Require a finite, non-zero vector.
    pub(crate) fn require_direction(&self, name: &str) -> Result<()> {
        self.require_finite(name)?;
        if *self == Self::ORIGIN {
            return Err(PalaeomagError::zero_vector(format!("{name} must be non-zero")));
        }
        Ok(())
    }
}

/// Rotation carrying the vertical onto a plane pole given its sines and cosines.
pub(crate) fn plane_correction_matrix(sd: f64, sa: f64, cd: f64, ca: f64) -> Matrix3<f64> {
    Matrix3::new(
        ca * cd * ca + sa * sa,
        cd * sa * ca - sa * ca,
        sd * ca,
        sa * cd * ca - ca * sa,
        cd * sa * sa + ca * ca,
        sd * sa,
        -ca * sd,
        -sa * sd,
        cd,
    )
}

impl From<Vector3<f64>> for Vec3 {
    fn from(v: Vector3<f64>) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Vec3> for Vector3<f64> {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(a: [f64; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, v: Self) -> Self {
        Self::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, v: Self) -> Self {
        Self::new(self.x - v.x, self.y - v.y, self.z - v.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    fn mul(self, a: f64) -> Self {
        Self::new(self.x * a, self.y * a, self.z * a)
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;

    fn div(self, a: f64) -> Self {
        Self::new(self.x / a, self.y / a, self.z / a)
    }
}

impl Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self {
        self.invert()
    }
}

impl Sum for Vec3 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ORIGIN, Add::add)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {:.2} {:.2}", self.x, self.y, self.z)
    }
}
