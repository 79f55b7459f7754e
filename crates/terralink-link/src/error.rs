//! Error types for propagation and link budget calculations.

use terralink_dem::DemError;
use terralink_geo::GeoError;
use thiserror::Error;

/// Errors from the propagation model.
///
/// These indicate a caller bug rather than bad user input: validated
/// requests never produce them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropagationError {
    /// Free-space loss is undefined for a distance of zero or less.
    #[error("Path distance must be positive, got {0} km")]
    NonPositiveDistance(f64),

    /// Clearance analysis needs a path of non-zero length.
    #[error("Path length is zero")]
    ZeroPathLength,

    /// Clearance analysis needs at least two samples.
    #[error("Terrain profile has {0} samples, need at least 2")]
    DegenerateProfile(usize),
}

/// Errors from a link budget request.
#[derive(Debug, Error)]
pub enum LinkBudgetError {
    /// Out-of-range request parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid coordinates.
    #[error(transparent)]
    Geo(#[from] GeoError),

    /// Terrain lookup failed in a way the fallback policy does not cover.
    #[error("Terrain error: {0}")]
    Terrain(#[from] DemError),

    /// Propagation model domain error.
    #[error("Propagation error: {0}")]
    Propagation(#[from] PropagationError),
}
