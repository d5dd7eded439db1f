//! Fisher (1953) statistics on sets of directions.
//!
//! # Definitions
//!
//! For N unit vectors with resultant length R:
//!
//! - mean direction: the normalized vector sum
//! - precision: `k = (N - 1) / (N - R)`
//! - confidence cone: `α = acos(1 - ((N - R) / R)·((1/p)^(1/(N-1)) - 1))`,
//!   with `p = 1 - confidence` (α95 for the default 0.95)
//!
//! The cone formula can leave the domain of `acos` for very dispersed data.
//! The angle is then NaN and [`FisherParams::is_a95_valid`] reports it.

use crate::config::StatsConfig;
use crate::error::Result;
use crate::math::Vec3;
use std::fmt;

/// Common view of Fisher-type mean statistics.
///
/// Implemented by plain Fisher means and by combined great-circle means so
/// that pole calculations can take either.
pub trait FisherParams {
    /// Unit mean direction.
    fn mean_direction(&self) -> Vec3;

    /// Confidence cone half-angle in degrees.
    fn a95(&self) -> f64;

    /// Estimated precision parameter.
    fn k(&self) -> f64;

    /// Number of contributing directions or circles.
    fn n(&self) -> usize;

    /// Resultant vector length.
    fn r(&self) -> f64;

    /// True if the confidence angle is a real number.
    fn is_a95_valid(&self) -> bool {
        self.a95().is_finite()
    }

    /// Closed outline of the confidence cone around the mean direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the confidence angle is undefined.
    fn confidence_circle(&self) -> Result<Vec<Vec3>> {
        self.confidence_circle_with_config(&StatsConfig::default())
    }

    /// As [`FisherParams::confidence_circle`], with the azimuthal point
    /// spacing taken from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the confidence angle is undefined or the
    /// configuration is invalid.
    fn confidence_circle_with_config(&self, config: &StatsConfig) -> Result<Vec<Vec3>> {
        config.validate()?;
        self.mean_direction()
            .small_circle_with_step(self.a95(), config.small_circle_step_deg)
    }
}

/// Fisher mean of a set of directions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FisherValues {
    mean_direction: Vec3,
    a95: f64,
    k: f64,
    r: f64,
    directions: Vec<Vec3>,
}

impl FisherValues {
    /// Fisher statistics at 95% confidence.
    ///
    /// # Arguments
    ///
    /// * `vectors` - Directions; magnitudes are ignored
    ///
    /// # Returns
    ///
    /// `None` for fewer than two directions, where the statistics are
    /// undefined.
    ///
    /// # Errors
    ///
    /// Returns an error if any vector is zero or not finite.
    pub fn calculate(vectors: &[Vec3]) -> Result<Option<Self>> {
        Self::calculate_with_config(vectors, &StatsConfig::default())
    }

    /// Fisher statistics at the confidence level in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or any vector is
    /// zero or not finite.
    pub fn calculate_with_config(vectors: &[Vec3], config: &StatsConfig) -> Result<Option<Self>> {
        config.validate()?;
        for v in vectors {
            v.require_direction("direction")?;
        }
        if vectors.len() < 2 {
            return Ok(None);
        }

        let directions: Vec<Vec3> = vectors.iter().map(Vec3::normalize).collect();
        let n = directions.len() as f64;
        let sum: Vec3 = directions.iter().copied().sum();
        let r = sum.mag();

        let (k, a95) = if n - r > n * 1e-12 {
            let p = config.significance();
            let k = (n - 1.0) / (n - r);
            let a95 = (1.0 - ((n - r) / r) * ((1.0 / p).powf(1.0 / (n - 1.0)) - 1.0))
                .acos()
                .to_degrees();
            (k, a95)
        } else {
            (f64::NAN, f64::NAN)
        };

        Ok(Some(Self {
            mean_direction: sum.normalize(),
            a95,
            k,
            r,
            directions,
        }))
    }

    /// The normalized input directions.
    #[must_use]
    pub fn directions(&self) -> &[Vec3] {
        &self.directions
    }
}

impl FisherParams for FisherValues {
    fn mean_direction(&self) -> Vec3 {
        self.mean_direction
    }

    fn a95(&self) -> f64 {
        self.a95
    }

    fn k(&self) -> f64 {
        self.k
    }

    fn n(&self) -> usize {
        self.directions.len()
    }

    fn r(&self) -> f64 {
        self.r
    }
}

impl fmt::Display for FisherValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dec. {:.1} / inc. {:.1} / a95 {:.1} / k {:.1} / nDirs {}",
            self.mean_direction.dec_deg(),
            self.mean_direction.inc_deg(),
            self.a95,
            self.k,
            self.directions.len()
        )
    }
}
