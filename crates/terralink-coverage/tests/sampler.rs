//! Coverage generation against flat, failing and stalling providers.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use approx::assert_abs_diff_eq;
use terralink_coverage::{CoverageConfig, CoverageSampler, PointSource, FALLBACK_POLYGON_POINTS};
use terralink_dem::{DemError, FlatTerrainProvider, Result, TerrainProfile, TerrainProfileProvider};
use terralink_geo::{distance_km, GeoPoint};

struct AlwaysFailing {
    calls: AtomicUsize,
}

impl TerrainProfileProvider for AlwaysFailing {
    fn profile(&self, _: GeoPoint, _: GeoPoint, _: usize) -> Result<TerrainProfile> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(DemError::ProviderUnavailable("down".into()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Sleeps on every call while `stalled` is set.
struct Stalling {
    stalled: AtomicBool,
}

impl TerrainProfileProvider for Stalling {
    fn profile(&self, start: GeoPoint, end: GeoPoint, n: usize) -> Result<TerrainProfile> {
        if self.stalled.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(300));
        }
        Ok(TerrainProfile::flat(start, end, n, 100.0))
    }

    fn name(&self) -> &str {
        "stalling"
    }
}

/// Counts calls and takes `delay` to answer each one.
struct Slow {
    calls: AtomicUsize,
    delay: Duration,
}

impl TerrainProfileProvider for Slow {
    fn profile(&self, start: GeoPoint, end: GeoPoint, n: usize) -> Result<TerrainProfile> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        Ok(TerrainProfile::flat(start, end, n, 100.0))
    }

    fn name(&self) -> &str {
        "slow"
    }
}

fn origin() -> GeoPoint {
    GeoPoint::new(39.74, -104.99).unwrap()
}

fn relaxed_config() -> CoverageConfig {
    CoverageConfig {
        deadline: Duration::from_secs(60),
        ..CoverageConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn flat_terrain_reaches_max_range() {
    let sampler = CoverageSampler::new(Arc::new(FlatTerrainProvider::new(100.0)), relaxed_config());
    let result = sampler
        .generate_coverage_polygon(origin(), 1.0, 15.0, 20.0)
        .await
        .unwrap();

    assert_eq!(result.points.len(), 24);
    assert_eq!(result.modeled_bearings, 24);
    assert_eq!(result.estimated_bearings, 0);
    assert!(!result.timed_out);
    assert!(!result.fallback_polygon);
    assert!(result.is_fully_modeled());
    for (i, p) in result.points.iter().enumerate() {
        assert_abs_diff_eq!(p.bearing_deg, i as f64 * 15.0);
        assert!(p.distance_km <= 20.0 + 1e-9);
        assert!(p.link_margin_db.unwrap() >= 10.0);
        let d = distance_km(origin(), GeoPoint { lat: p.lat, lng: p.lng });
        assert_abs_diff_eq!(d, p.distance_km, epsilon = 1e-6);
    }
    // 1 W over flat ground keeps 10 dB of margin out to 20 km
    assert_abs_diff_eq!(result.max_distance_km(), 20.0, epsilon = 1e-9);
}

#[tokio::test(flavor = "multi_thread")]
async fn resolution_sets_bearing_count() {
    let config = CoverageConfig {
        max_range_km: 2.0,
        ..relaxed_config()
    };
    let sampler = CoverageSampler::new(Arc::new(FlatTerrainProvider::new(0.0)), config);
    let result = sampler
        .generate_coverage_polygon(origin(), 1.0, 10.0, 2.0)
        .await
        .unwrap();
    assert_eq!(result.points.len(), 36);
    assert!(result.points.windows(2).all(|w| w[0].bearing_deg < w[1].bearing_deg));
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_provider_uses_step_estimates() {
    let provider = Arc::new(AlwaysFailing {
        calls: AtomicUsize::new(0),
    });
    let sampler = CoverageSampler::new(Arc::clone(&provider), relaxed_config());
    let result = sampler.generate(origin(), 1.0).await.unwrap();

    assert!(result.points.len() >= 3);
    assert!(!result.fallback_polygon);
    assert!(provider.calls.load(Ordering::SeqCst) > 0);
    for p in &result.points {
        assert_eq!(p.source, PointSource::StepEstimate);
        assert!(p.distance_km > 0.0);
        assert!(p.distance_km <= result.estimated_radius_km + 1e-9);
        assert_eq!(p.link_margin_db, None);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn weak_transmitter_with_failing_provider_gets_fallback_circle() {
    let provider = Arc::new(AlwaysFailing {
        calls: AtomicUsize::new(0),
    });
    let sampler = CoverageSampler::new(provider, relaxed_config());
    // sqrt(0.001) * 5 km ≈ 0.16 km, shorter than the first 0.5 km step
    let result = sampler.generate(origin(), 0.001).await.unwrap();

    assert!(result.fallback_polygon);
    assert_eq!(result.points.len(), FALLBACK_POLYGON_POINTS);
    for p in &result.points {
        assert_eq!(p.source, PointSource::Fallback);
        assert_abs_diff_eq!(p.distance_km, 2.0);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn deadline_fills_remaining_bearings() {
    let provider = Arc::new(Stalling {
        stalled: AtomicBool::new(true),
    });
    let config = CoverageConfig {
        deadline: Duration::from_millis(200),
        max_range_km: 10.0,
        ..CoverageConfig::default()
    };
    let sampler = CoverageSampler::new(Arc::clone(&provider), config);
    let result = sampler.generate(origin(), 1.0).await.unwrap();
    provider.stalled.store(false, Ordering::SeqCst);

    assert!(result.timed_out);
    assert_eq!(result.points.len(), 24);
    assert_eq!(result.estimated_bearings, 24);
    assert!(result.elapsed_ms < 2_000.0);
    for p in &result.points {
        assert_eq!(p.source, PointSource::DeadlineEstimate);
        assert_abs_diff_eq!(p.distance_km, 5.0);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn zero_deadline_estimates_everything() {
    let config = CoverageConfig {
        deadline: Duration::ZERO,
        ..CoverageConfig::default()
    };
    let sampler = CoverageSampler::new(Arc::new(FlatTerrainProvider::new(0.0)), config);
    let result = sampler.generate(origin(), 4.0).await.unwrap();
    assert!(result.timed_out);
    assert_eq!(result.modeled_bearings, 0);
    assert!(result
        .points
        .iter()
        .all(|p| p.source == PointSource::DeadlineEstimate && p.distance_km == 10.0));
}

#[tokio::test(flavor = "multi_thread")]
async fn abandoned_rays_stop_calling_provider() {
    let provider = Arc::new(Slow {
        calls: AtomicUsize::new(0),
        delay: Duration::from_millis(50),
    });
    let config = CoverageConfig {
        deadline: Duration::from_millis(100),
        max_range_km: 10.0,
        batch_size: 6,
        ..CoverageConfig::default()
    };
    let sampler = CoverageSampler::new(Arc::clone(&provider), config);
    let result = sampler.generate(origin(), 1.0).await.unwrap();
    let calls_at_return = provider.calls.load(Ordering::SeqCst);

    // Every detached ray finishes its current lookup and then stops
    tokio::time::sleep(Duration::from_millis(500)).await;
    let calls_later = provider.calls.load(Ordering::SeqCst);

    assert!(result.timed_out);
    assert!(calls_at_return > 0);
    assert!(
        calls_later - calls_at_return <= 6,
        "{} lookups issued after the deadline",
        calls_later - calls_at_return
    );
    // No bearing can finish 20 steps of 50 ms inside 100 ms
    assert_eq!(result.modeled_bearings, 0);
    assert!(result
        .points
        .iter()
        .all(|p| p.source == PointSource::DeadlineEstimate));
}
