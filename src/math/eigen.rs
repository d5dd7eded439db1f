//! Orientation tensor eigen decomposition.
//!
//! Builds the symmetric 3×3 tensor `Σ vᵢ vᵢᵀ` from a set of vectors and
//! decomposes it with nalgebra's symmetric eigen solver. The principal axes
//! drive both line fitting (PCA) and plane fitting (great circles), and the
//! eigenvalue ratios give the maximum angular deviation (MAD) statistics of
//! Kirschvink (1980).

use super::vector::Vec3;
use crate::error::{PalaeomagError, Result};
use nalgebra::{Matrix3, SymmetricEigen, Vector3};
use tracing::debug;

/// Eigenvalues below this fraction of the largest are numerical noise.
const RELATIVE_ZERO: f64 = 1e-12;

/// Eigenvalues and eigenvectors of an orientation tensor.
///
/// Pairs are sorted by descending eigenvalue. Stored eigenvalues are
/// absolute values. Eigenvector signs are arbitrary.
#[derive(Debug, Clone, PartialEq)]
pub struct Eigens {
    values: [f64; 3],
    vectors: [Vec3; 3],
}

impl Eigens {
    /// Decompose the orientation tensor of a set of vectors.
    ///
    /// # Arguments
    ///
    /// * `vectors` - Input vectors
    /// * `normalize` - Scale each vector to unit length before accumulating
    ///
    /// # Errors
    ///
    /// Returns an error if `vectors` is empty or any vector is not finite.
    pub fn from_vectors(vectors: &[Vec3], normalize: bool) -> Result<Self> {
        if vectors.is_empty() {
            return Err(PalaeomagError::insufficient_data(1, 0));
        }
        for v in vectors {
            v.require_finite("eigen input")?;
        }
        Ok(Self::from_tensor(&orientation_tensor(vectors, normalize)))
    }

    /// Decompose a symmetric 3×3 matrix.
    ///
    /// Only the lower triangle is read.
    #[must_use]
    pub fn from_tensor(tensor: &Matrix3<f64>) -> Self {
        let eigen = SymmetricEigen::new(*tensor);

        let mut pairs: Vec<(f64, Vector3<f64>)> = eigen
            .eigenvalues
            .iter()
            .enumerate()
            .map(|(i, &v)| (v, eigen.eigenvectors.column(i).into_owned()))
            .collect();

        pairs.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let largest = pairs.iter().map(|p| p.0.abs()).fold(0.0, f64::max);
        let mut values = [pairs[0].0.abs(), pairs[1].0.abs(), pairs[2].0.abs()];
        for value in &mut values {
            if *value != 0.0 && *value <= largest * RELATIVE_ZERO {
                debug!(value = *value, largest, "treating negligible eigenvalue as zero");
                *value = 0.0;
            }
        }

        Self {
            values,
            vectors: [
                Vec3::from(pairs[0].1),
                Vec3::from(pairs[1].1),
                Vec3::from(pairs[2].1),
            ],
        }
    }

    /// Eigenvalues, largest first.
    #[must_use]
    pub const fn values(&self) -> [f64; 3] {
        self.values
    }

    /// Unit eigenvectors in the order of [`Eigens::values`].
    #[must_use]
    pub const fn vectors(&self) -> [Vec3; 3] {
        self.vectors
    }

    /// The i-th eigenvector (0 = principal axis, 2 = minor axis).
    #[must_use]
    pub fn vector(&self, i: usize) -> Vec3 {
        debug_assert!(i < 3);
        self.vectors[i]
    }

    /// Maximum angular deviation of the minor axis, in degrees.
    ///
    /// This is the planarity MAD: zero when all vectors lie in the plane
    /// of the two leading axes. Defined as zero when the intermediate or
    /// largest eigenvalue vanishes.
    #[must_use]
    pub fn mad1(&self) -> f64 {
        let [max, int, min] = self.values;
        if int != 0.0 && max != 0.0 {
            (min / int + min / max).sqrt().atan().to_degrees()
        } else {
            0.0
        }
    }

    /// Maximum angular deviation of the principal axis, in degrees.
    ///
    /// This is the linearity MAD: zero when all vectors are parallel to
    /// the principal axis.
    #[must_use]
    pub fn mad3(&self) -> f64 {
        let [max, int, min] = self.values;
        ((int + min) / max).sqrt().atan().to_degrees()
    }
}

/// Orientation tensor `Σ vᵢ vᵢᵀ`.
#[must_use]
pub fn orientation_tensor(vectors: &[Vec3], normalize: bool) -> Matrix3<f64> {
    vectors
        .iter()
        .map(|v| if normalize { v.normalize() } else { *v })
        .fold(Matrix3::zeros(), |acc, v| acc + v.outer())
}
