//! Kent (1982) confidence ellipses.
//!
//! A [`KentParams`] record holds a mean direction, the τ eigenvalue with its
//! uncertainty, and two orthogonal semi-axes (η, ζ) of a confidence ellipse
//! around the mean. Records usually come from anisotropy bootstrap scripts,
//! one whitespace-separated line per principal axis:
//!
//! ```text
//! tau tau_sigma dec inc eta eta_dec eta_inc zeta zeta_dec zeta_inc
//! ```
//!
//! All angles in the record are in degrees. Semi-axis magnitudes are held
//! internally in radians and directions as unit vectors.
//!
//! # Example
//!
//! ```
//! use palaeomag::KentParams;
//!
//! let kent: KentParams = "0.33546 0.00026 46.7 5.7 10.5 315.0 14.1 12.6 163.0 74.1".parse()?;
//! assert!((kent.eta_mag().to_degrees() - 10.5).abs() < 1e-12);
//! let outline = kent.ellipse()?;
//! assert_eq!(outline.first(), outline.last());
//! # Ok::<(), palaeomag::PalaeomagError>(())
//! ```

use crate::config::StatsConfig;
use crate::error::{PalaeomagError, Result};
use crate::math::vector::require_finite;
use crate::math::Vec3;
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::str::FromStr;

/// Number of fields in a Kent record.
pub const KENT_FIELDS: usize = 10;

/// Parse the first `count` whitespace-separated numbers of `line`.
///
/// Trailing fields are ignored.
pub(crate) fn leading_numbers(line: &str, count: usize) -> Result<Vec<f64>> {
    let values = line
        .split_whitespace()
        .take(count)
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| PalaeomagError::parse(format!("'{token}' is not a number")))
        })
        .collect::<Result<Vec<f64>>>()?;
    if values.len() < count {
        return Err(PalaeomagError::parse(format!(
            "expected {count} numeric fields, found {} in '{line}'",
            values.len()
        )));
    }
    Ok(values)
}

/// Parameters of a Kent confidence ellipse.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KentParams {
    tau: f64,
    tau_sigma: f64,
    mean: Vec3,
    eta_mag: f64,
    eta_dir: Vec3,
    zeta_mag: f64,
    zeta_dir: Vec3,
}

impl KentParams {
    /// Build from the ten record fields, all angles in degrees.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        tau: f64,
        tau_sigma: f64,
        dec: f64,
        inc: f64,
        eta_mag: f64,
        eta_dec: f64,
        eta_inc: f64,
        zeta_mag: f64,
        zeta_dec: f64,
        zeta_inc: f64,
    ) -> Self {
        Self {
            tau,
            tau_sigma,
            mean: Vec3::from_polar_degrees(1.0, inc, dec),
            eta_mag: eta_mag.to_radians(),
            eta_dir: Vec3::from_polar_degrees(1.0, eta_inc, eta_dec),
            zeta_mag: zeta_mag.to_radians(),
            zeta_dir: Vec3::from_polar_degrees(1.0, zeta_inc, zeta_dec),
        }
    }

    /// Build from the ten record fields in record order.
    #[must_use]
    pub fn from_fields(f: [f64; KENT_FIELDS]) -> Self {
        Self::new(f[0], f[1], f[2], f[3], f[4], f[5], f[6], f[7], f[8], f[9])
    }

    /// The ten record fields in record order, angles in degrees.
    #[must_use]
    pub fn to_fields(&self) -> [f64; KENT_FIELDS] {
        [
            self.tau,
            self.tau_sigma,
            self.mean.dec_deg(),
            self.mean.inc_deg(),
            self.eta_mag.to_degrees(),
            self.eta_dir.dec_deg(),
            self.eta_dir.inc_deg(),
            self.zeta_mag.to_degrees(),
            self.zeta_dir.dec_deg(),
            self.zeta_dir.inc_deg(),
        ]
    }

    #[must_use]
    pub const fn tau(&self) -> f64 {
        self.tau
    }

    #[must_use]
    pub const fn tau_sigma(&self) -> f64 {
        self.tau_sigma
    }

    /// Unit mean direction.
    #[must_use]
    pub const fn mean(&self) -> Vec3 {
        self.mean
    }

    /// η semi-axis in radians.
    #[must_use]
    pub const fn eta_mag(&self) -> f64 {
        self.eta_mag
    }

    #[must_use]
    pub const fn eta_dir(&self) -> Vec3 {
        self.eta_dir
    }

    /// ζ semi-axis in radians.
    #[must_use]
    pub const fn zeta_mag(&self) -> f64 {
        self.zeta_mag
    }

    #[must_use]
    pub const fn zeta_dir(&self) -> Vec3 {
        self.zeta_dir
    }

    /// Closed outline of the confidence ellipse with default step sizes.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is not finite, or neither semi-axis
    /// is positive.
    pub fn ellipse(&self) -> Result<Vec<Vec3>> {
        self.ellipse_with_config(&StatsConfig::default())
    }

    /// Closed outline of the confidence ellipse on the unit sphere.
    ///
    /// The ellipse is traced around the downward vertical, then rotated so
    /// that its centre lies on the mean direction. Points are emitted when
    /// they have moved far enough from the last emitted point, or when the
    /// parameter has advanced by more than `ellipse_theta_gap`, so that
    /// strongly curved parts of thin ellipses get more points. The last
    /// point repeats the first.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, any parameter is
    /// not finite, or neither semi-axis is positive.
    pub fn ellipse_with_config(&self, config: &StatsConfig) -> Result<Vec<Vec3>> {
        config.validate()?;
        self.validate_for_ellipse()?;
        let c_dec = self.mean.dec_rad();
        let c_inc = self.mean.inc_rad();
        let (eta, zeta) = (self.eta_mag, self.zeta_mag);

        let eta_top = self
            .eta_dir
            .rot_z(-c_dec)?
            .rot_y(c_inc - FRAC_PI_2)?
            .rot_z(c_dec)?;
        let eta_top_dec = eta_top.dec_rad();

        let mut points = Vec::new();
        let mut previous: Option<(Vec3, f64)> = None;
        let mut theta = 0.0;
        while theta < 2.0 * PI {
            let a = eta * theta.sin();
            let b = zeta * theta.cos();
            let denom = a.hypot(b);
            let r = if denom > 0.0 { eta * zeta / denom } else { 0.0 };
            let v = Vec3::from_polar_radians(1.0, FRAC_PI_2 - r, theta + eta_top_dec);

            let emit = match previous {
                None => true,
                Some((prev, prev_theta)) => {
                    prev.angle_to(v).abs() > config.ellipse_spacing_limit
                        || theta - prev_theta > config.ellipse_theta_gap
                }
            };
            if emit {
                points.push(v.rot_z(-c_dec)?.rot_y(FRAC_PI_2 - c_inc)?.rot_z(c_dec)?);
                previous = Some((v, theta));
            }
            theta += config.ellipse_theta_step;
        }
        if let Some(&first) = points.first() {
            points.push(first);
        }
        Ok(points)
    }

    fn validate_for_ellipse(&self) -> Result<()> {
        require_finite(self.tau, "tau")?;
        require_finite(self.tau_sigma, "tau sigma")?;
        require_finite(self.eta_mag, "eta")?;
        require_finite(self.zeta_mag, "zeta")?;
        self.mean.require_direction("mean")?;
        self.eta_dir.require_direction("eta direction")?;
        self.zeta_dir.require_direction("zeta direction")?;
        if self.eta_mag < 0.0 || self.zeta_mag < 0.0 || self.eta_mag.max(self.zeta_mag) == 0.0 {
            return Err(PalaeomagError::invalid_input(format!(
                "ellipse semi-axes must be non-negative and not both zero, got eta = {} zeta = {}",
                self.eta_mag, self.zeta_mag
            )));
        }
        Ok(())
    }
}

impl FromStr for KentParams {
    type Err = PalaeomagError;

    /// Parse a record of ten whitespace-separated numbers.
    fn from_str(s: &str) -> Result<Self> {
        let count = s.split_whitespace().count();
        if count != KENT_FIELDS {
            return Err(PalaeomagError::parse(format!(
                "Kent record needs {KENT_FIELDS} fields, found {count}"
            )));
        }
        let values = leading_numbers(s, KENT_FIELDS)?;
        let mut fields = [0.0; KENT_FIELDS];
        fields.copy_from_slice(&values);
        Ok(Self::from_fields(fields))
    }
}

impl fmt::Display for KentParams {
    /// Writes a record in the bootstrap output layout: τ and τσ with five
    /// decimals, angles with one (or with the formatter precision if given).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = f.precision().unwrap_or(1);
        let fields = self.to_fields();
        write!(f, "{:.5} {:.5}", fields[0], fields[1])?;
        for value in &fields[2..] {
            write!(f, " {value:.dp$}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CAMPBELL: &str = "0.33546 0.00026    46.7     5.7    10.5   315.0    14.1    12.6   163.0    74.1";

    #[test]
    fn test_constructor_and_getters() {
        let kp = KentParams::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0);
        let parsed: KentParams = "1 2 3 4 5 6 7 8 9 10".parse().unwrap();
        for k in [&kp, &parsed] {
            assert_relative_eq!(k.tau(), 1.0);
            assert_relative_eq!(k.tau_sigma(), 2.0);
            assert_relative_eq!(k.mean().dec_deg(), 3.0, epsilon = 1e-10);
            assert_relative_eq!(k.mean().inc_deg(), 4.0, epsilon = 1e-10);
            assert_relative_eq!(k.eta_mag(), 5f64.to_radians(), epsilon = 1e-10);
            assert_relative_eq!(k.eta_dir().dec_deg(), 6.0, epsilon = 1e-10);
            assert_relative_eq!(k.eta_dir().inc_deg(), 7.0, epsilon = 1e-10);
            assert_relative_eq!(k.zeta_mag(), 8f64.to_radians(), epsilon = 1e-10);
            assert_relative_eq!(k.zeta_dir().dec_deg(), 9.0, epsilon = 1e-10);
            assert_relative_eq!(k.zeta_dir().inc_deg(), 10.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_record_round_trip() {
        let kp: KentParams = CAMPBELL.parse().unwrap();
        assert_eq!(
            kp.to_string(),
            "0.33546 0.00026 46.7 5.7 10.5 315.0 14.1 12.6 163.0 74.1"
        );
        let again: KentParams = kp.to_string().parse().unwrap();
        for (a, b) in kp.to_fields().iter().zip(again.to_fields()) {
            assert_relative_eq!(*a, b, epsilon = 1e-9);
        }
        assert_eq!(format!("{kp:.3}").split(' ').nth(2), Some("46.700"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!("1 2 3".parse::<KentParams>(), Err(PalaeomagError::Parse(_))));
        assert!("1 2 3 4 5 6 7 8 9 x".parse::<KentParams>().is_err());
        assert!("1 2 3 4 5 6 7 8 9 10 11".parse::<KentParams>().is_err());
        assert_eq!(leading_numbers("1 2 3 extra", 3), Ok(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_ellipse_outline() {
        let kp: KentParams = CAMPBELL.parse().unwrap();
        let points = kp.ellipse().unwrap();
        assert!(points.len() > 50);
        assert_eq!(points.first(), points.last());

        let (lo, hi) = (kp.eta_mag().min(kp.zeta_mag()), kp.eta_mag().max(kp.zeta_mag()));
        for p in &points {
            assert_relative_eq!(p.mag(), 1.0, epsilon = 1e-12);
            let distance = p.dot(kp.mean()).clamp(-1.0, 1.0).acos();
            assert!(distance > lo - 1e-9 && distance < hi + 1e-9);
        }

        // The first point lies along the η axis, η away from the mean.
        let first = points[0];
        assert_relative_eq!(first.dot(kp.mean()).acos(), kp.eta_mag(), epsilon = 1e-9);
        let normal = kp.mean().cross(kp.eta_dir()).normalize();
        assert!(first.dot(normal).abs() < 1e-2);
        assert!(first.dot(kp.eta_dir()) > 0.0);
    }

    #[test]
    fn test_ellipse_rejects_degenerate_records() {
        for record in [
            "0.3 0.0 46.7 5.7 NaN 315.0 14.1 12.6 163.0 74.1",
            "0.3 0.0 46.7 5.7 10.5 315.0 14.1 inf 163.0 74.1",
            "NaN 0.0 46.7 5.7 10.5 315.0 14.1 12.6 163.0 74.1",
            "0.3 0.0 NaN 5.7 10.5 315.0 14.1 12.6 163.0 74.1",
        ] {
            let kp: KentParams = record.parse().unwrap();
            assert!(matches!(kp.ellipse(), Err(PalaeomagError::NonFinite { .. })), "{record}");
        }

        let zero: KentParams = "0.3 0.0 46.7 5.7 0.0 315.0 14.1 0.0 163.0 74.1".parse().unwrap();
        assert!(matches!(zero.ellipse(), Err(PalaeomagError::InvalidInput(_))));
        let negative: KentParams = "0.3 0.0 46.7 5.7 -2.0 315.0 14.1 3.0 163.0 74.1".parse().unwrap();
        assert!(negative.ellipse().is_err());
    }

    #[test]
    fn test_ellipse_with_one_zero_semi_axis_is_finite() {
        let kp: KentParams = "0.3 0.0 46.7 5.7 0.0 315.0 14.1 12.6 163.0 74.1".parse().unwrap();
        let points = kp.ellipse().unwrap();
        assert!(!points.is_empty());
        assert!(points.iter().all(Vec3::is_finite));
    }

    #[test]
    fn test_ellipse_resolution_follows_config() {
        let kp: KentParams = CAMPBELL.parse().unwrap();
        let coarse = kp.ellipse_with_config(&StatsConfig::coarse()).unwrap();
        let fine = kp.ellipse_with_config(&StatsConfig::high_resolution()).unwrap();
        assert!(coarse.len() < fine.len());
    }
}
