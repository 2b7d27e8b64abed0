//! Geographic position value type.
//!
//! A [`Position`] is immutable once built: the constructor clamps both axes
//! into a safe range and every movement produces a fresh value. Equality is
//! exact field equality, which is what the sync loop relies on to detect
//! "nothing moved" without an epsilon.

use std::fmt;

/// Largest latitude magnitude we will ever send to the shell. Staying short
/// of the poles keeps coordinates inside what location backends accept.
pub const MAX_LATITUDE: f64 = 89.9;

/// Largest longitude magnitude, kept short of the antimeridian.
pub const MAX_LONGITUDE: f64 = 179.9;

/// A clamped latitude/longitude pair, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    latitude: f64,
    longitude: f64,
}

impl Position {
    /// Builds a position, clamping latitude into [-89.9, 89.9] and longitude
    /// into [-179.9, 179.9]. Out-of-range input is absorbed, never an error.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE),
            longitude: longitude.clamp(-MAX_LONGITUDE, MAX_LONGITUDE),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Position {
    /// Renders as `"<latitude> <longitude>"`, the cache file format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.latitude, self.longitude)
    }
}
