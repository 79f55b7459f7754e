//! Error types for the geometry crate.

use thiserror::Error;

/// Errors raised when constructing or validating geographic coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// Latitude or longitude is outside the valid range, or not finite.
    #[error("Invalid coordinate ({lat}, {lng}): latitude must be within ±90 and longitude within ±180")]
    InvalidCoordinate {
        /// Requested latitude.
        lat: f64,
        /// Requested longitude.
        lng: f64,
    },

    /// A coordinate string could not be parsed.
    #[error("Cannot parse coordinate '{0}', expected 'LAT,LNG'")]
    Parse(String),
}
