//! Configuration for the iterative and rendering parts of the statistics engine.
//!
//! This module provides the [`StatsConfig`] struct which centralizes the
//! tunable numbers used by the solvers (iteration caps, tolerances, confidence
//! level) and by the outline generators (ellipse and small-circle step sizes).
//!
//! # Example
//!
//! ```
//! use palaeomag::StatsConfig;
//!
//! // Use default configuration
//! let config = StatsConfig::default();
//!
//! // Finer outlines for publication plots
//! let fine = StatsConfig::high_resolution();
//! assert!(fine.validate().is_ok());
//! ```

use crate::error::{PalaeomagError, Result};
use std::f64::consts::PI;

/// Configuration for statistics and outline generation.
///
/// # Solver Parameters
///
/// - `confidence`: Confidence level for Fisher-type a95 values (0.95 gives α95).
/// - `aralev_max_iterations` / `aralev_tolerance`: Arason-Levi maximum likelihood search.
/// - `great_circles_max_iterations` / `great_circles_stable_limit`: combined great-circle mean.
///
/// # Rendering Parameters
///
/// - `ellipse_theta_step`: Parameter step when tracing a Kent ellipse.
/// - `ellipse_spacing_limit`: Minimum angular spacing (radians) between emitted ellipse points.
/// - `ellipse_theta_gap`: Maximum parameter gap before a point is emitted regardless of spacing.
/// - `small_circle_step_deg`: Declination step for small circles.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatsConfig {
    /// Confidence level for α-type cones (0 < confidence < 1).
    pub confidence: f64,

    /// Maximum number of interior iterations of the Arason-Levi search.
    pub aralev_max_iterations: usize,

    /// Convergence tolerance for θ (degrees) and relative κ in the Arason-Levi search.
    pub aralev_tolerance: f64,

    /// Maximum number of passes of the combined great-circle mean.
    pub great_circles_max_iterations: usize,

    /// Largest movement (radians) of any circle point for the combined mean to count as stable.
    pub great_circles_stable_limit: f64,

    /// Parameter step (radians) when tracing a Kent ellipse.
    pub ellipse_theta_step: f64,

    /// Angular spacing (radians) above which an ellipse point is emitted.
    pub ellipse_spacing_limit: f64,

    /// Parameter gap (radians) above which an ellipse point is emitted.
    pub ellipse_theta_gap: f64,

    /// Declination step (degrees) between small-circle points.
    pub small_circle_step_deg: f64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            confidence: 0.95,
            aralev_max_iterations: 10_000,
            aralev_tolerance: 1e-6,
            great_circles_max_iterations: 1000,
            great_circles_stable_limit: PI / 1800.0,
            ellipse_theta_step: 1e-4,
            ellipse_spacing_limit: 1e-2,
            ellipse_theta_gap: 2.0 * PI / 50.0,
            small_circle_step_deg: 5.0,
        }
    }
}

impl StatsConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(PalaeomagError::invalid_config(
                "confidence must lie strictly between 0 and 1",
            ));
        }
        if self.aralev_max_iterations < 1 {
            return Err(PalaeomagError::invalid_config(
                "aralev_max_iterations must be at least 1",
            ));
        }
        if !(self.aralev_tolerance > 0.0 && self.aralev_tolerance.is_finite()) {
            return Err(PalaeomagError::invalid_config(
                "aralev_tolerance must be positive",
            ));
        }
        if self.great_circles_max_iterations < 1 {
            return Err(PalaeomagError::invalid_config(
                "great_circles_max_iterations must be at least 1",
            ));
        }
        if !(self.great_circles_stable_limit > 0.0 && self.great_circles_stable_limit < PI) {
            return Err(PalaeomagError::invalid_config(
                "great_circles_stable_limit must be in (0, π)",
            ));
        }
        if !(self.ellipse_theta_step > 0.0 && self.ellipse_theta_step < 2.0 * PI) {
            return Err(PalaeomagError::invalid_config(
                "ellipse_theta_step must be in (0, 2π)",
            ));
        }
        if !(self.ellipse_spacing_limit > 0.0 && self.ellipse_spacing_limit.is_finite()) {
            return Err(PalaeomagError::invalid_config(
                "ellipse_spacing_limit must be positive",
            ));
        }
        if !(self.ellipse_theta_gap >= self.ellipse_theta_step && self.ellipse_theta_gap.is_finite())
        {
            return Err(PalaeomagError::invalid_config(
                "ellipse_theta_gap must be at least ellipse_theta_step",
            ));
        }
        if !(self.small_circle_step_deg > 0.0 && self.small_circle_step_deg < 360.0) {
            return Err(PalaeomagError::invalid_config(
                "small_circle_step_deg must be in (0, 360)",
            ));
        }
        Ok(())
    }

    /// Preset for publication-quality outlines.
    ///
    /// Ellipses and small circles are traced with roughly four times as many points.
    #[must_use]
    pub fn high_resolution() -> Self {
        Self {
            ellipse_theta_step: 2.5e-5,
            ellipse_spacing_limit: 2.5e-3,
            ellipse_theta_gap: 2.0 * PI / 200.0,
            small_circle_step_deg: 1.0,
            ..Self::default()
        }
    }

    /// Preset for quick interactive previews.
    #[must_use]
    pub fn coarse() -> Self {
        Self {
            ellipse_theta_step: 1e-3,
            ellipse_spacing_limit: 5e-2,
            ellipse_theta_gap: 2.0 * PI / 20.0,
            small_circle_step_deg: 15.0,
            ..Self::default()
        }
    }

    /// Set the confidence level.
    #[must_use]
    pub const fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set the Arason-Levi iteration cap.
    #[must_use]
    pub const fn with_aralev_max_iterations(mut self, iterations: usize) -> Self {
        self.aralev_max_iterations = iterations;
        self
    }

    /// Set the combined great-circle mean iteration cap.
    #[must_use]
    pub const fn with_great_circles_max_iterations(mut self, iterations: usize) -> Self {
        self.great_circles_max_iterations = iterations;
        self
    }

    /// Set the small-circle declination step.
    #[must_use]
    pub const fn with_small_circle_step_deg(mut self, step: f64) -> Self {
        self.small_circle_step_deg = step;
        self
    }

    /// The significance level `1 - confidence` used in α formulas.
    #[must_use]
    #[inline]
    pub fn significance(&self) -> f64 {
        1.0 - self.confidence
    }
}
