//! Elevation backend configuration.

use std::time::Duration;

use terralink_model::properties::{
    PlannerScope, ResolvedProperties, ELEVATION_API_URL, ELEVATION_BATCH_SIZE,
    ELEVATION_CACHE_CAPACITY, ELEVATION_CACHE_TTL_S, ELEVATION_CONCURRENCY, ELEVATION_FALLBACK_M,
    ELEVATION_SOURCE, ELEVATION_TIMEOUT_S,
};
use tracing::{info, warn};

use crate::{
    CachedElevationSource, FlatTerrainProvider, HttpElevationSource, MemoryElevationCache, Result,
    SampledProfileProvider, TerrainProfileProvider,
};

/// Which elevation backend to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElevationBackend {
    /// JSON lookup API.
    #[default]
    Http,
    /// Constant elevation, no network.
    Flat,
}

impl ElevationBackend {
    /// Parse a backend name ("http" or "flat", case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "http" => Some(ElevationBackend::Http),
            "flat" => Some(ElevationBackend::Flat),
            _ => None,
        }
    }
}

/// Settings for building a terrain provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationConfig {
    /// Backend to use.
    pub backend: ElevationBackend,
    /// Lookup endpoint for the HTTP backend.
    pub api_url: String,
    /// Points per lookup request.
    pub batch_size: usize,
    /// Lookup requests in flight at once.
    pub concurrency: usize,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Elevation of flat and fallback profiles, in meters.
    pub fallback_elevation_m: f64,
    /// Lifetime of cached elevations.
    pub cache_ttl: Duration,
    /// Maximum cached elevations; 0 disables caching.
    pub cache_capacity: usize,
}

impl Default for ElevationConfig {
    fn default() -> Self {
        Self::from_properties(&ResolvedProperties::new())
    }
}

impl ElevationConfig {
    /// Read the `elevation/*` properties.
    pub fn from_properties(props: &ResolvedProperties<PlannerScope>) -> Self {
        let source: String = props.get(&ELEVATION_SOURCE);
        let backend = ElevationBackend::parse(&source).unwrap_or_else(|| {
            warn!(source = %source, "Unknown elevation source, using http");
            ElevationBackend::Http
        });
        Self {
            backend,
            api_url: props.get(&ELEVATION_API_URL),
            batch_size: props.get(&ELEVATION_BATCH_SIZE),
            concurrency: props.get(&ELEVATION_CONCURRENCY),
            timeout: secs(props.get(&ELEVATION_TIMEOUT_S)),
            fallback_elevation_m: props.get(&ELEVATION_FALLBACK_M),
            cache_ttl: secs(props.get(&ELEVATION_CACHE_TTL_S)),
            cache_capacity: props.get(&ELEVATION_CACHE_CAPACITY),
        }
    }

    /// Build the configured provider.
    ///
    /// The HTTP backend owns a blocking HTTP client, so build it outside of
    /// any async runtime.
    pub fn build_provider(&self) -> Result<Box<dyn TerrainProfileProvider>> {
        match self.backend {
            ElevationBackend::Flat => {
                info!(elevation_m = self.fallback_elevation_m, "Using flat terrain");
                Ok(Box::new(FlatTerrainProvider::new(self.fallback_elevation_m)))
            }
            ElevationBackend::Http => {
                let source = HttpElevationSource::new(self.api_url.clone(), self.timeout)?;
                info!(
                    url = %self.api_url,
                    batch_size = self.batch_size,
                    concurrency = self.concurrency,
                    cache_capacity = self.cache_capacity,
                    "Using HTTP elevation source"
                );
                if self.cache_capacity == 0 {
                    return Ok(Box::new(SampledProfileProvider::new(
                        source,
                        self.batch_size,
                        self.concurrency,
                    )?));
                }
                let cached = CachedElevationSource::new(
                    source,
                    MemoryElevationCache::new(self.cache_capacity),
                    self.cache_ttl,
                );
                Ok(Box::new(SampledProfileProvider::new(
                    cached,
                    self.batch_size,
                    self.concurrency,
                )?))
            }
        }
    }
}

/// Non-finite or negative durations collapse to zero.
fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}
