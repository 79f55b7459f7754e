//! Profiles assembled from point elevation lookups.

use rayon::prelude::*;
use terralink_geo::{interpolate_path, GeoPoint};
use tracing::{debug, trace};

use crate::{DemError, ElevationSource, Result, TerrainProfile, TerrainProfileProvider};

/// Builds profiles by sampling the great-circle path and looking up each
/// point in an [`ElevationSource`].
///
/// Points are split into batches of `batch_size`. Batches run on a dedicated
/// thread pool of `concurrency` workers, so no more than `concurrency`
/// lookups are in flight for one provider regardless of how many profiles
/// are requested at once. Results are reassembled in path order.
#[derive(Debug)]
pub struct SampledProfileProvider<S> {
    source: S,
    batch_size: usize,
    pool: rayon::ThreadPool,
}

impl<S: ElevationSource> SampledProfileProvider<S> {
    /// Create a provider over `source`.
    pub fn new(source: S, batch_size: usize, concurrency: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency.max(1))
            .thread_name(|i| format!("terralink-elevation-{}", i))
            .build()
            .map_err(|e| DemError::ProviderUnavailable(format!("thread pool: {}", e)))?;
        Ok(Self {
            source,
            batch_size: batch_size.max(1),
            pool,
        })
    }

    /// The wrapped elevation source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Points per lookup batch.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Worker threads used for lookups.
    pub fn concurrency(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn fetch_batch(&self, index: usize, batch: &[GeoPoint]) -> Result<Vec<f64>> {
        let elevations = self.source.elevations(batch)?;
        if elevations.len() != batch.len() {
            return Err(DemError::SampleCountMismatch {
                expected: batch.len(),
                actual: elevations.len(),
            });
        }
        trace!(batch = index, points = batch.len(), "Fetched elevation batch");
        Ok(elevations)
    }
}

impl<S: ElevationSource> TerrainProfileProvider for SampledProfileProvider<S> {
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

        let points = interpolate_path(start, end, sample_count);
        let batches: Vec<&[GeoPoint]> = points.chunks(self.batch_size).collect();

        let results: Result<Vec<Vec<f64>>> = self.pool.install(|| {
            batches
                .par_iter()
                .enumerate()
                .map(|(i, batch)| self.fetch_batch(i, batch))
                .collect()
        });
        let elevations: Vec<f64> = results?.into_iter().flatten().collect();

        debug!(
            source = self.source.name(),
            samples = sample_count,
            batches = batches.len(),
            "Built terrain profile"
        );
        Ok(TerrainProfile::from_points(&points, &elevations))
    }

    fn name(&self) -> &str {
        self.source.name()
    }
}
