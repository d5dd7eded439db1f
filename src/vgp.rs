//! Virtual geomagnetic poles.
//!
//! Converts a site-mean direction into the position of the geocentric
//! dipole pole that would produce it (Butler 1992, section 7), together with
//! the semi-axes of the pole's confidence oval.

use crate::error::Result;
use crate::fisher::FisherParams;
use crate::location::Location;
use crate::math::vector::require_finite;
use crate::math::Vec3;
use std::f64::consts::PI;
use std::fmt;

/// A virtual geomagnetic pole with its confidence oval.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vgp {
    location: Location,
    dp: f64,
    dm: f64,
}

impl Vgp {
    /// Pole for a site direction.
    ///
    /// # Arguments
    ///
    /// * `direction` - Site-mean direction (need not be normalized)
    /// * `a95` - Confidence angle of the direction in degrees; NaN gives NaN `dp` and `dm`
    /// * `site` - Sampling location
    ///
    /// # Returns
    ///
    /// The pole location (longitude in `[0, 360)`) and the semi-axes `dp`
    /// (along the site-pole great circle) and `dm` (perpendicular to it), in
    /// degrees.
    ///
    /// # Errors
    ///
    /// Returns an error if the direction is zero or not finite, or the site
    /// coordinates are not finite.
    pub fn calculate(direction: Vec3, a95: f64, site: Location) -> Result<Self> {
        direction.require_direction("direction")?;
        require_finite(site.lat_deg(), "site latitude")?;
        require_finite(site.long_deg(), "site longitude")?;

        let inc = direction.inc_rad();
        let dec = direction.dec_rad();
        let site_lat = site.lat_rad();
        let site_long = site.long_rad();

        // Palaeocolatitude from the dipole formula tan I = 2 cot p.
        let p = 2f64.atan2(inc.tan());
        let pole_lat = (site_lat.sin() * p.cos() + site_lat.cos() * p.sin() * dec.cos())
            .clamp(-1.0, 1.0)
            .asin();
        let beta = (p.sin() * dec.sin() / pole_lat.cos()).clamp(-1.0, 1.0).asin();
        let pole_long = if p.cos() >= site_lat.sin() * pole_lat.sin() {
            site_long + beta
        } else {
            site_long + PI - beta
        }
        .rem_euclid(2.0 * PI);

        let dp = a95 * (1.0 + 3.0 * p.cos().powi(2)) / 2.0;
        let dm = a95 * p.sin() / inc.cos();

        Ok(Self {
            location: Location::from_radians(pole_lat, pole_long),
            dp,
            dm,
        })
    }

    /// Pole for the mean direction and confidence angle of a Fisher-type mean.
    ///
    /// # Errors
    ///
    /// As [`Vgp::calculate`]. An undefined a95 leaves the pole position
    /// valid and makes `dp` and `dm` NaN.
    pub fn from_fisher<F: FisherParams + ?Sized>(params: &F, site: Location) -> Result<Self> {
        Self::calculate(params.mean_direction(), params.a95(), site)
    }

    /// Pole position.
    #[must_use]
    pub const fn location(&self) -> Location {
        self.location
    }

    /// Semi-axis along the site-pole great circle, in degrees.
    #[must_use]
    pub const fn dp(&self) -> f64 {
        self.dp
    }

    /// Semi-axis perpendicular to the site-pole great circle, in degrees.
    #[must_use]
    pub const fn dm(&self) -> f64 {
        self.dm
    }
}

impl fmt::Display for Vgp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2} {:.2}", self.location, self.dp, self.dm)
    }
}
