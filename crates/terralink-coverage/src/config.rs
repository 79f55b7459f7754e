//! Coverage sampler settings.

use std::time::Duration;

use terralink_model::properties::{
    PlannerScope, ResolvedProperties, COVERAGE_BATCH_SIZE, COVERAGE_DEADLINE_S,
    COVERAGE_FALLBACK_RADIUS_KM, COVERAGE_MAX_RANGE_KM, COVERAGE_MIN_LINK_MARGIN_DB,
    COVERAGE_RESOLUTION_DEG, COVERAGE_SAMPLES_PER_KM, COVERAGE_STEP_KM, COVERAGE_TERRAIN_FACTOR,
};

/// Fewest terrain samples fetched for one ray-march step.
pub const MIN_STEP_SAMPLES: usize = 10;

/// Most terrain samples fetched for one ray-march step.
pub const MAX_STEP_SAMPLES: usize = 100;

/// Most bearings one request may march (0.1 degree spacing).
pub const MAX_BEARINGS: usize = 3600;

/// Most steps one ray may take before reaching its maximum range.
pub const MAX_RAY_STEPS: usize = 10_000;

/// Settings for [`CoverageSampler`](crate::CoverageSampler).
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageConfig {
    /// Angular spacing between bearings, degrees.
    pub resolution_deg: f64,
    /// Farthest distance marched along a bearing, km.
    pub max_range_km: f64,
    /// Ray-march step, km.
    pub step_km: f64,
    /// Margin a step must reach to extend the boundary, dB.
    pub min_link_margin_db: f64,
    /// Bearings marched concurrently.
    pub batch_size: usize,
    /// Wall-clock budget for one polygon.
    pub deadline: Duration,
    /// Terrain samples per km of step profile.
    pub samples_per_km: usize,
    /// Scale applied to closed-form radius estimates.
    pub terrain_factor: f64,
    /// Radius of the synthesized fallback circle, km.
    pub fallback_radius_km: f64,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self::from_properties(&ResolvedProperties::new())
    }
}

impl CoverageConfig {
    /// Read the `coverage/*` properties.
    pub fn from_properties(props: &ResolvedProperties<PlannerScope>) -> Self {
        let deadline_s: f64 = props.get(&COVERAGE_DEADLINE_S);
        Self {
            resolution_deg: props.get(&COVERAGE_RESOLUTION_DEG),
            max_range_km: props.get(&COVERAGE_MAX_RANGE_KM),
            step_km: props.get(&COVERAGE_STEP_KM),
            min_link_margin_db: props.get(&COVERAGE_MIN_LINK_MARGIN_DB),
            batch_size: props.get(&COVERAGE_BATCH_SIZE),
            deadline: Duration::try_from_secs_f64(deadline_s).unwrap_or(Duration::ZERO),
            samples_per_km: props.get(&COVERAGE_SAMPLES_PER_KM),
            terrain_factor: props.get(&COVERAGE_TERRAIN_FACTOR),
            fallback_radius_km: props.get(&COVERAGE_FALLBACK_RADIUS_KM),
        }
    }

    /// Terrain samples for a step profile of `distance_km`.
    pub fn step_samples(&self, distance_km: f64) -> usize {
        let wanted = (distance_km * self.samples_per_km as f64).ceil();
        if wanted.is_finite() && wanted > 0.0 {
            (wanted as usize).clamp(MIN_STEP_SAMPLES, MAX_STEP_SAMPLES)
        } else {
            MIN_STEP_SAMPLES
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoverageConfig::default();
        assert_eq!(config.resolution_deg, 15.0);
        assert_eq!(config.max_range_km, 20.0);
        assert_eq!(config.step_km, 0.5);
        assert_eq!(config.min_link_margin_db, 10.0);
        assert_eq!(config.batch_size, 6);
        assert_eq!(config.deadline, Duration::from_secs(8));
        assert_eq!(config.samples_per_km, 10);
        assert_eq!(config.terrain_factor, 1.0);
        assert_eq!(config.fallback_radius_km, 2.0);
    }

    #[test]
    fn test_from_properties() {
        let mut props: ResolvedProperties<PlannerScope> = ResolvedProperties::new();
        props.set(&COVERAGE_RESOLUTION_DEG, 10.0).unwrap();
        props.set(&COVERAGE_DEADLINE_S, 0.25).unwrap();
        props.set(&COVERAGE_BATCH_SIZE, 2).unwrap();
        let config = CoverageConfig::from_properties(&props);
        assert_eq!(config.resolution_deg, 10.0);
        assert_eq!(config.deadline, Duration::from_millis(250));
        assert_eq!(config.batch_size, 2);
    }

    #[test]
    fn test_step_samples() {
        let config = CoverageConfig::default();
        assert_eq!(config.step_samples(0.5), MIN_STEP_SAMPLES);
        assert_eq!(config.step_samples(3.2), 32);
        assert_eq!(config.step_samples(20.0), MAX_STEP_SAMPLES);
        assert_eq!(config.step_samples(f64::NAN), MIN_STEP_SAMPLES);
    }
}
