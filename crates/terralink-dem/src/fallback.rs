//! Flat-profile fallback policy.

use metrics::counter;
use terralink_geo::GeoPoint;
use terralink_metrics::metric_defs;
use tracing::warn;

use crate::{Result, TerrainProfile, TerrainProfileProvider};

/// Wraps a provider and never fails on provider errors.
///
/// When the wrapped provider fails, the answer is a two-point flat profile at
/// `fallback_elevation_m`, marked degraded. Flat two-point profiles have no
/// interior samples, so downstream clearance analysis sees no obstructions
/// and computes no diffraction loss. Invalid coordinates are still errors.
#[derive(Debug, Clone)]
pub struct FallbackProvider<P> {
    inner: P,
    fallback_elevation_m: f64,
}

impl<P: TerrainProfileProvider> FallbackProvider<P> {
    /// Wrap `inner`.
    pub fn new(inner: P, fallback_elevation_m: f64) -> Self {
        Self {
            inner,
            fallback_elevation_m,
        }
    }

    /// The elevation used for substituted profiles.
    pub fn fallback_elevation_m(&self) -> f64 {
        self.fallback_elevation_m
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: TerrainProfileProvider> TerrainProfileProvider for FallbackProvider<P> {
    fn profile(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        sample_count: usize,
    ) -> Result<TerrainProfile> {
        start.validate()?;
        end.validate()?;
        match self.inner.profile(start, end, sample_count) {
            Ok(profile) => Ok(profile),
            Err(e) => {
                counter!(metric_defs::TERRAIN_FLAT_FALLBACKS.name).increment(1);
                warn!(
                    provider = self.inner.name(),
                    error = %e,
                    elevation_m = self.fallback_elevation_m,
                    "Terrain profile unavailable, using flat fallback"
                );
                Ok(TerrainProfile::flat_fallback(
                    start,
                    end,
                    self.fallback_elevation_m,
                ))
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DemError, FlatTerrainProvider};

    struct Broken;

    impl TerrainProfileProvider for Broken {
        fn profile(&self, _: GeoPoint, _: GeoPoint, _: usize) -> Result<TerrainProfile> {
            Err(DemError::RateLimited)
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[test]
    fn test_passes_through_success() {
        let provider = FallbackProvider::new(FlatTerrainProvider::new(30.0), 100.0);
        let a = GeoPoint { lat: 1.0, lng: 1.0 };
        let b = GeoPoint { lat: 1.01, lng: 1.0 };
        let profile = provider.profile(a, b, 10).unwrap();
        assert_eq!(profile.len(), 10);
        assert!(!profile.is_degraded());
        assert_eq!(profile.samples()[3].elevation_m, 30.0);
    }

    #[test]
    fn test_substitutes_flat_profile() {
        let provider = FallbackProvider::new(Broken, 100.0);
        let a = GeoPoint { lat: 1.0, lng: 1.0 };
        let b = GeoPoint { lat: 1.05, lng: 1.0 };
        let profile = provider.profile(a, b, 64).unwrap();
        assert_eq!(profile.len(), 2);
        assert!(profile.is_degraded());
        assert!(profile.samples().iter().all(|s| s.elevation_m == 100.0));
    }

    #[test]
    fn test_invalid_coordinates_still_fail() {
        let provider = FallbackProvider::new(Broken, 100.0);
        let a = GeoPoint { lat: 1.0, lng: 181.0 };
        let b = GeoPoint { lat: 1.0, lng: 1.0 };
        assert!(provider.profile(a, b, 8).is_err());
    }
}
