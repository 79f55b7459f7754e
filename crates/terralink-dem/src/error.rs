//! Error types for terrain lookups.

use terralink_geo::GeoError;
use thiserror::Error;

/// Errors that can occur while building a terrain profile.
#[derive(Debug, Error)]
pub enum DemError {
    /// The elevation backend could not answer.
    #[error("Elevation provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// HTTP transport error.
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the request with HTTP 429.
    #[error("Elevation provider rate limit exceeded")]
    RateLimited,

    /// The backend answered with something that is not a lookup response.
    #[error("Invalid elevation response: {0}")]
    InvalidResponse(String),

    /// The backend returned a different number of elevations than requested.
    #[error("Expected {expected} elevations, got {actual}")]
    SampleCountMismatch {
        /// Points requested.
        expected: usize,
        /// Elevations returned.
        actual: usize,
    },

    /// A profile needs at least two samples.
    #[error("Invalid sample count {0} (need at least 2)")]
    InvalidSampleCount(usize),

    /// Invalid endpoint coordinates.
    #[error(transparent)]
    Geo(#[from] GeoError),
}

impl DemError {
    /// Short label used as the `reason` metric label.
    pub fn reason(&self) -> &'static str {
        match self {
            DemError::ProviderUnavailable(_) => "unavailable",
            DemError::Http(_) => "http",
            DemError::RateLimited => "rate_limited",
            DemError::InvalidResponse(_) => "invalid_response",
            DemError::SampleCountMismatch { .. } => "count_mismatch",
            DemError::InvalidSampleCount(_) => "invalid_sample_count",
            DemError::Geo(_) => "invalid_coordinate",
        }
    }
}
