//! Coverage errors.

use terralink_geo::GeoError;
use thiserror::Error;

/// Errors from a coverage request.
///
/// Terrain failures and deadline expiry are not errors: they degrade the
/// result and are reported through its annotations.
#[derive(Debug, Error)]
pub enum CoverageError {
    /// Out-of-range request parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<GeoError> for CoverageError {
    fn from(e: GeoError) -> Self {
        CoverageError::InvalidInput(e.to_string())
    }
}
