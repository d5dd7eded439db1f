//! Palaeomagnetic Statistics
//!
//! Directional statistics for palaeomagnetic and rock-magnetic data.
//!
//! This library covers the numerical core of a palaeomagnetic workflow:
//! fitting lines and planes to demagnetization data, averaging directions
//! on the sphere, estimating mean inclinations from inclination-only data,
//! confidence ellipses for anisotropy axes, and conversion of site means to
//! virtual geomagnetic poles.
//!
//! # Features
//!
//! - **Line and plane fits**: Kirschvink (1980) principal component analysis
//! - **Spherical means**: Fisher (1953) and McFadden & McElhinny (1988)
//! - **Inclination-only**: Arason & Levi (2010) maximum likelihood estimator
//! - **Anisotropy**: Kent (1982) ellipses and the bootstrap script protocol
//! - **Poles**: virtual geomagnetic poles with dp/dm confidence ovals
//!
//! # Quick Start
//!
//! ```
//! use palaeomag::{FisherValues, Location, PcaFit, Vec3, Vgp};
//!
//! // Three specimens, each with a demagnetization path towards the origin.
//! let specimens = [
//!     [Vec3::new(3.0, 1.0, 2.0), Vec3::new(2.0, 0.7, 1.4), Vec3::new(1.0, 0.3, 0.7)],
//!     [Vec3::new(3.0, 1.2, 2.2), Vec3::new(2.0, 0.8, 1.4), Vec3::new(1.0, 0.4, 0.8)],
//!     [Vec3::new(2.8, 1.0, 2.1), Vec3::new(1.9, 0.6, 1.3), Vec3::new(0.9, 0.3, 0.7)],
//! ];
//!
//! let mut directions = Vec::new();
//! for steps in &specimens {
//!     directions.push(PcaFit::calculate(steps, true)?.direction());
//! }
//!
//! let mean = FisherValues::calculate(&directions)?.expect("three directions");
//! let pole = Vgp::from_fisher(&mean, Location::from_degrees(52.0, 4.5))?;
//! assert!(pole.location().lat_deg() > 0.0);
//! # Ok::<(), palaeomag::PalaeomagError>(())
//! ```
//!
//! # Conventions
//!
//! | Quantity | Convention |
//! |----------|------------|
//! | Axes | x north, y east, z down |
//! | Inclination | positive downwards, `[-90, 90]` degrees |
//! | Declination | clockwise from north, `[0, 360)` degrees |
//! | Angles in the API | radians unless the name ends in `_deg` |
//! | Confidence angles (a95, t63) | degrees |
//!
//! # Configuration
//!
//! Iteration limits, tolerances, confidence level and plotting resolution
//! are collected in [`StatsConfig`]:
//!
//! ```
//! use palaeomag::StatsConfig;
//!
//! let default = StatsConfig::default();
//! let fine = StatsConfig::high_resolution();
//! let strict = StatsConfig::default().with_great_circles_max_iterations(50);
//! assert!(fine.validate().is_ok() && strict.validate().is_ok());
//! assert!((default.significance() - 0.05).abs() < 1e-12);
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod anisotropy;
pub mod config;
pub mod error;
pub mod fisher;
pub mod great_circle;
pub mod great_circles;
pub mod inclination;
pub mod kent;
pub mod location;
pub mod math;
pub mod pca;
pub mod vgp;

// Re-exports for convenient access
pub use anisotropy::{KentMethod, KentScript, Tensor};
pub use config::StatsConfig;
pub use error::{PalaeomagError, Result};
pub use fisher::{FisherParams, FisherValues};
pub use great_circle::GreatCircle;
pub use great_circles::GreatCirclesMean;
pub use inclination::{ArasonLevi, ArithmeticMean};
pub use kent::KentParams;
pub use location::Location;
pub use math::{Eigens, MeasurementAxis, Vec3};
pub use pca::PcaFit;
pub use vgp::Vgp;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
