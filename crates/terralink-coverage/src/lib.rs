//! # terralink-coverage
//!
//! Directional coverage boundaries around a transmitter.
//!
//! For each bearing, the sampler walks outward in fixed steps, fetching the
//! terrain profile from the transmitter to each candidate point and running
//! the link budget over it. The last step whose margin clears the threshold
//! is the boundary on that bearing. Bearings run in bounded batches on the
//! blocking pool under a wall-clock deadline; bearings the deadline cuts off
//! get a closed-form radius instead, and a result that still has fewer than
//! three vertices is replaced by a synthesized circle.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use terralink_coverage::{CoverageConfig, CoverageSampler};
//! use terralink_dem::FlatTerrainProvider;
//! use terralink_geo::GeoPoint;
//!
//! # tokio::runtime::Runtime::new()?.block_on(async {
//! let config = CoverageConfig { resolution_deg: 90.0, max_range_km: 2.0, ..Default::default() };
//! let sampler = CoverageSampler::new(Arc::new(FlatTerrainProvider::new(100.0)), config);
//! let coverage = sampler.generate(GeoPoint::new(45.0, -122.0)?, 1.0).await?;
//! assert_eq!(coverage.points.len(), 4);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # })?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod error;
mod estimate;
mod sampler;

pub use config::{
    CoverageConfig, MAX_BEARINGS, MAX_RAY_STEPS, MAX_STEP_SAMPLES, MIN_STEP_SAMPLES,
};
pub use error::CoverageError;
pub use estimate::{
    estimate_coverage_radius, fallback_polygon, FALLBACK_POLYGON_POINTS, REFERENCE_POWER_W,
    REFERENCE_RADIUS_KM,
};
pub use sampler::{bearings, CoveragePoint, CoverageResult, CoverageSampler, PointSource};
