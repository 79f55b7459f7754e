//! Geographic point type.

use crate::{GeoError, Result};
use std::str::FromStr;

/// A point on the Earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    /// Latitude in degrees (positive = north).
    pub lat: f64,
    /// Longitude in degrees (positive = east).
    pub lng: f64,
}

impl GeoPoint {
    /// Create a validated point.
    ///
    /// Fails with [`GeoError::InvalidCoordinate`] when `|lat| > 90`, `|lng| > 180`,
    /// or either value is not finite.
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        let point = Self { lat, lng };
        point.validate()?;
        Ok(point)
    }

    /// Check the coordinate ranges of an already constructed point.
    pub fn validate(&self) -> Result<()> {
        let valid = self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.0
            && self.lng.abs() <= 180.0;
        if valid {
            Ok(())
        } else {
            Err(GeoError::InvalidCoordinate {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }

    pub(crate) fn lat_rad(&self) -> f64 {
        self.lat.to_radians()
    }

    pub(crate) fn lng_rad(&self) -> f64 {
        self.lng.to_radians()
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

/// Parses `"LAT,LNG"` (whitespace around either number is ignored).
impl FromStr for GeoPoint {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| GeoError::Parse(s.to_string()))?;
        let lat: f64 = lat.trim().parse().map_err(|_| GeoError::Parse(s.to_string()))?;
        let lng: f64 = lng.trim().parse().map_err(|_| GeoError::Parse(s.to_string()))?;
        GeoPoint::new(lat, lng)
    }
}
