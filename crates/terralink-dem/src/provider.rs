//! Provider traits.

use std::sync::Arc;

use terralink_geo::GeoPoint;

use crate::{Result, TerrainProfile};

/// Produces terrain profiles along great-circle paths.
///
/// Implementations must return exactly `sample_count` samples spanning the
/// whole path in increasing distance order, or an error. Fallback policies
/// (see [`FallbackProvider`](crate::FallbackProvider)) are the one exception:
/// they may answer with a degraded two-point profile.
///
/// Calls may block on I/O; async callers should run them on a blocking pool.
pub trait TerrainProfileProvider: Send + Sync {
    /// Build the profile from `start` to `end`.
    fn profile(&self, start: GeoPoint, end: GeoPoint, sample_count: usize)
        -> Result<TerrainProfile>;

    /// Short name for logs and metric labels.
    fn name(&self) -> &str;
}

/// Looks up ground elevations for individual points.
pub trait ElevationSource: Send + Sync {
    /// Elevations in meters, one per input point, in input order.
    fn elevations(&self, points: &[GeoPoint]) -> Result<Vec<f64>>;

    /// Short name for logs and metric labels.
    fn name(&self) -> &str;
}

impl<P: TerrainProfileProvider + ?Sized> TerrainProfileProvider for &P {
    fn profile(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        sample_count: usize,
    ) -> Result<TerrainProfile> {
        (**self).profile(start, end, sample_count)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<P: TerrainProfileProvider + ?Sized> TerrainProfileProvider for Arc<P> {
    fn profile(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        sample_count: usize,
    ) -> Result<TerrainProfile> {
        (**self).profile(start, end, sample_count)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<P: TerrainProfileProvider + ?Sized> TerrainProfileProvider for Box<P> {
    fn profile(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        sample_count: usize,
    ) -> Result<TerrainProfile> {
        (**self).profile(start, end, sample_count)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<S: ElevationSource + ?Sized> ElevationSource for Arc<S> {
    fn elevations(&self, points: &[GeoPoint]) -> Result<Vec<f64>> {
        (**self).elevations(points)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
