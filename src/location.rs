//! Geographic locations for sites and poles.

use crate::math::Vec3;
use std::fmt;

/// A point on the Earth's surface, stored in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    lat_deg: f64,
    long_deg: f64,
}

impl Location {
    /// Location from latitude and longitude in degrees.
    #[must_use]
    pub const fn from_degrees(lat_deg: f64, long_deg: f64) -> Self {
        Self { lat_deg, long_deg }
    }

    /// Location from latitude and longitude in radians.
    #[must_use]
    pub fn from_radians(lat_rad: f64, long_rad: f64) -> Self {
        Self::from_degrees(lat_rad.to_degrees(), long_rad.to_degrees())
    }

    /// Location of the point where a direction from the Earth's centre
    /// meets the surface, taking inclination as latitude and declination
    /// as longitude.
    #[must_use]
    pub fn from_vec3(v: Vec3) -> Self {
        Self::from_degrees(v.inc_deg(), v.dec_deg())
    }

    /// Unit vector with this latitude as inclination and this longitude as
    /// declination.
    #[must_use]
    pub fn to_vec3(&self) -> Vec3 {
        Vec3::from_polar_degrees(1.0, self.lat_deg, self.long_deg)
    }

    #[must_use]
    pub const fn lat_deg(&self) -> f64 {
        self.lat_deg
    }

    #[must_use]
    pub const fn long_deg(&self) -> f64 {
        self.long_deg
    }

    #[must_use]
    pub fn lat_rad(&self) -> f64 {
        self.lat_deg.to_radians()
    }

    #[must_use]
    pub fn long_rad(&self) -> f64 {
        self.long_deg.to_radians()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {:.2}", self.lat_deg, self.long_deg)
    }
}
