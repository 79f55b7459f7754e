//! Terrain samples and profiles.

use serde::Serialize;
use terralink_geo::{distance_km, interpolate_path, GeoPoint};

/// One elevation sample along a path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TerrainSample {
    /// Great-circle distance from the path start in kilometers.
    pub distance_km: f64,
    /// Ground elevation in meters.
    pub elevation_m: f64,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

/// An ordered sequence of samples from the path start to its end.
///
/// Distances are non-decreasing and the first sample is at distance 0.
/// A profile built by a fallback policy is marked `degraded`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerrainProfile {
    samples: Vec<TerrainSample>,
    degraded: bool,
}

/// Summary statistics of a profile's ground elevations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TerrainStats {
    /// Number of samples.
    pub sample_count: usize,
    /// Distance between adjacent samples in meters.
    pub resolution_m: f64,
    /// Lowest ground elevation in meters.
    pub min_elevation_m: f64,
    /// Highest ground elevation in meters.
    pub max_elevation_m: f64,
    /// Mean ground elevation in meters.
    pub mean_elevation_m: f64,
    /// Highest minus lowest elevation.
    pub delta_h_m: f64,
}

impl TerrainProfile {
    /// Wrap samples produced by a provider.
    pub fn new(samples: Vec<TerrainSample>) -> Self {
        Self {
            samples,
            degraded: false,
        }
    }

    /// Build a profile from path points and their elevations.
    ///
    /// `points` and `elevations` must have the same length.
    pub fn from_points(points: &[GeoPoint], elevations: &[f64]) -> Self {
        debug_assert_eq!(points.len(), elevations.len());
        let start = points.first().copied().unwrap_or_default();
        let samples = points
            .iter()
            .zip(elevations)
            .map(|(p, &elevation_m)| TerrainSample {
                distance_km: distance_km(start, *p),
                elevation_m,
                lat: p.lat,
                lng: p.lng,
            })
            .collect();
        Self::new(samples)
    }

    /// A profile of `sample_count` points at constant elevation.
    pub fn flat(start: GeoPoint, end: GeoPoint, sample_count: usize, elevation_m: f64) -> Self {
        let points = interpolate_path(start, end, sample_count);
        let elevations = vec![elevation_m; points.len()];
        Self::from_points(&points, &elevations)
    }

    /// The two-point flat profile substituted when a provider fails.
    pub fn flat_fallback(start: GeoPoint, end: GeoPoint, elevation_m: f64) -> Self {
        let mut profile = Self::flat(start, end, 2, elevation_m);
        profile.degraded = true;
        profile
    }

    /// Mark or clear the degraded flag.
    pub fn with_degraded(mut self, degraded: bool) -> Self {
        self.degraded = degraded;
        self
    }

    /// Whether this profile was substituted by a fallback policy.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// The samples in path order.
    pub fn samples(&self) -> &[TerrainSample] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the profile has no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Distance of the last sample from the start.
    pub fn total_distance_km(&self) -> f64 {
        self.samples.last().map(|s| s.distance_km).unwrap_or(0.0)
    }

    /// Ground elevation at the path start.
    pub fn start_elevation_m(&self) -> Option<f64> {
        self.samples.first().map(|s| s.elevation_m)
    }

    /// Ground elevation at the path end.
    pub fn end_elevation_m(&self) -> Option<f64> {
        self.samples.last().map(|s| s.elevation_m)
    }

    /// Elevation statistics, or `None` for an empty profile.
    pub fn stats(&self) -> Option<TerrainStats> {
        if self.samples.is_empty() {
            return None;
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for s in &self.samples {
            min = min.min(s.elevation_m);
            max = max.max(s.elevation_m);
            sum += s.elevation_m;
        }
        let n = self.samples.len();
        let resolution_m = if n > 1 {
            self.total_distance_km() * 1000.0 / (n - 1) as f64
        } else {
            0.0
        };
        Some(TerrainStats {
            sample_count: n,
            resolution_m,
            min_elevation_m: min,
            max_elevation_m: max,
            mean_elevation_m: sum / n as f64,
            delta_h_m: max - min,
        })
    }
}
