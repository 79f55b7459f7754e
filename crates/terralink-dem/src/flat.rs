//! Constant-elevation terrain.

use terralink_geo::GeoPoint;

use crate::{DemError, ElevationSource, Result, TerrainProfile, TerrainProfileProvider};

/// Terrain with the same ground elevation everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatTerrainProvider {
    elevation_m: f64,
}

impl FlatTerrainProvider {
    /// Create a provider at `elevation_m` meters.
    pub fn new(elevation_m: f64) -> Self {
        Self { elevation_m }
    }

    /// The constant elevation.
    pub fn elevation_m(&self) -> f64 {
        self.elevation_m
    }
}

impl TerrainProfileProvider for FlatTerrainProvider {
    fn profile(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        sample_count: usize,
    ) -> Result<TerrainProfile> {
        if sample_count < 2 {
            return Err(DemError::InvalidSampleCount(sample_count));
        }
        start.validate()?;
        end.validate()?;
        Ok(TerrainProfile::flat(start, end, sample_count, self.elevation_m))
    }

    fn name(&self) -> &str {
        "flat"
    }
}

impl ElevationSource for FlatTerrainProvider {
    fn elevations(&self, points: &[GeoPoint]) -> Result<Vec<f64>> {
        Ok(vec![self.elevation_m; points.len()])
    }

    fn name(&self) -> &str {
        "flat"
    }
}
