//! # terralink-dem
//!
//! Terrain profiles along great-circle paths.
//!
//! The link and coverage crates only see the [`TerrainProfileProvider`]
//! trait. This crate supplies the implementations behind it:
//!
//! - [`FlatTerrainProvider`] - constant ground elevation, for tests and offline use
//! - [`SampledProfileProvider`] - interpolates the path and fetches point
//!   elevations from any [`ElevationSource`] in bounded parallel batches
//! - [`HttpElevationSource`] - Open-Elevation style JSON lookup API
//! - [`CachedElevationSource`] - wraps a source with an [`ElevationCache`]
//! - [`FallbackProvider`] - substitutes a flat two-point profile when the
//!   wrapped provider fails, and marks the profile degraded
//!
//! ## Example
//!
//! ```
//! use terralink_dem::{FlatTerrainProvider, TerrainProfileProvider};
//! use terralink_geo::GeoPoint;
//!
//! let provider = FlatTerrainProvider::new(100.0);
//! let start = GeoPoint::new(45.0, -122.0)?;
//! let end = GeoPoint::new(45.05, -122.0)?;
//! let profile = provider.profile(start, end, 16)?;
//! assert_eq!(profile.len(), 16);
//! assert_eq!(profile.samples()[0].distance_km, 0.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod cache;
mod config;
mod error;
mod fallback;
mod flat;
mod http;
mod profile;
mod provider;
mod sampled;

pub use cache::{CacheKey, CachedElevationSource, ElevationCache, MemoryElevationCache};
pub use config::{ElevationBackend, ElevationConfig};
pub use error::DemError;
pub use fallback::FallbackProvider;
pub use flat::FlatTerrainProvider;
pub use http::HttpElevationSource;
pub use profile::{TerrainProfile, TerrainSample, TerrainStats};
pub use provider::{ElevationSource, TerrainProfileProvider};
pub use sampled::SampledProfileProvider;

/// Result type for terrain operations.
pub type Result<T> = std::result::Result<T, DemError>;
