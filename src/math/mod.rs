//! Numerical substrate for palaeomagnetic statistics.
//!
//! This module provides:
//! - [`vector`]: `Vec3` algebra, polar conversions and orientation corrections
//! - [`sphere`]: great-circle, small-circle and interpolation geometry
//! - [`eigen`]: orientation tensor eigen decomposition and MAD statistics
//! - [`special`]: Bessel functions, `coth` and Student's t quantiles

pub mod eigen;
pub mod special;
pub mod sphere;
pub mod vector;

pub use eigen::{orientation_tensor, Eigens};
pub use special::{coth, scaled_bessel, student_t_quantile, ScaledBessel, TwoSided};
pub use vector::{MeasurementAxis, Vec3};
