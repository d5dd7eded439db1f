//! Principal component line fits through demagnetization data.
//!
//! Implements the Kirschvink (1980) procedure: eigen-decompose the
//! orientation tensor of the (optionally centred) points and take the
//! principal axis as the line direction. The direction is oriented to
//! point from the last demagnetization step back towards the first, so it
//! follows the component that was removed during the run.
//!
//! # Example
//!
//! ```
//! use palaeomag::{PcaFit, Vec3};
//!
//! let steps = [
//!     Vec3::new(3.0, 3.0, 2.0),
//!     Vec3::new(2.0, 2.0, 1.0),
//!     Vec3::new(1.0, 1.0, 0.0),
//! ];
//! let fit = PcaFit::calculate(&steps, false)?;
//! assert!((fit.direction().dec_deg() - 45.0).abs() < 1e-6);
//! # Ok::<(), palaeomag::PalaeomagError>(())
//! ```

use crate::error::{PalaeomagError, Result};
use crate::math::{Eigens, Vec3};

/// Minimum number of points for a line fit.
pub const MIN_PCA_POINTS: usize = 2;

/// Result of a principal component line fit.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PcaFit {
    direction: Vec3,
    origin: Vec3,
    mad1: f64,
    mad3: f64,
    anchored: bool,
}

impl PcaFit {
    /// Fit a line through a sequence of demagnetization vectors.
    ///
    /// # Arguments
    ///
    /// * `points` - Vectors in demagnetization order
    /// * `anchored` - Force the line through the origin
    ///
    /// # Returns
    ///
    /// The fitted direction (unit vector), the centroid used as origin (the
    /// zero vector for anchored fits), and the MAD1/MAD3 statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two points are supplied or any point is
    /// not finite.
    pub fn calculate(points: &[Vec3], anchored: bool) -> Result<Self> {
        if points.len() < MIN_PCA_POINTS {
            return Err(PalaeomagError::insufficient_data(MIN_PCA_POINTS, points.len()));
        }
        for p in points {
            p.require_finite("point")?;
        }

        let origin = if anchored {
            Vec3::ORIGIN
        } else {
            Vec3::mean(points)?
        };
        let moved: Vec<Vec3> = points.iter().map(|&p| p - origin).collect();

        let eigens = Eigens::from_vectors(&moved, false)?;
        let mut direction = eigens.vector(0);

        // Point away from the demagnetization trend.
        let trend = moved[moved.len() - 1] - moved[0];
        if trend.dot(direction) > 0.0 {
            direction = direction.invert();
        }

        Ok(Self {
            direction,
            origin,
            mad1: eigens.mad1(),
            mad3: eigens.mad3(),
            anchored,
        })
    }

    /// Unit direction of the fitted line.
    #[must_use]
    pub const fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Point the line passes through: the centroid, or the origin if anchored.
    #[must_use]
    pub const fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Planarity MAD in degrees.
    #[must_use]
    pub const fn mad1(&self) -> f64 {
        self.mad1
    }

    /// Linearity MAD in degrees, the usual quality measure for a line fit.
    #[must_use]
    pub const fn mad3(&self) -> f64 {
        self.mad3
    }

    /// Whether the fit was constrained through the origin.
    #[must_use]
    pub const fn is_anchored(&self) -> bool {
        self.anchored
    }

    /// Parametric equation of the fitted line, `origin + direction·t`.
    #[must_use]
    pub fn equation(&self) -> String {
        let d = self.direction;
        let line = format!("({:.2} {:.2} {:.2})t", d.x, d.y, d.z);
        if self.anchored {
            line
        } else {
            let o = self.origin;
            format!("({:.2e} {:.2e} {:.2e}) + {line}", o.x, o.y, o.z)
        }
    }
}
