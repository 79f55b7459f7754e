//! # terralink-geo
//!
//! Spherical geometry used by the terrain and link crates.
//!
//! All functions treat the Earth as a sphere of radius [`EARTH_RADIUS_KM`].
//! Bearings are degrees clockwise from true north in `[0, 360)`.
//!
//! ## Example
//!
//! ```
//! use terralink_geo::{destination_point, distance_km, GeoPoint};
//!
//! let origin = GeoPoint::new(47.6062, -122.3321)?;
//! let east = destination_point(origin, 90.0, 10.0);
//! assert!((distance_km(origin, east) - 10.0).abs() < 1e-6);
//! # Ok::<(), terralink_geo::GeoError>(())
//! ```

mod error;
mod great_circle;
mod point;

pub use error::GeoError;
pub use great_circle::{
    central_angle, destination_point, distance_km, initial_bearing, interpolate_path,
};
pub use point::GeoPoint;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = EARTH_RADIUS_KM * 1000.0;

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, GeoError>;
