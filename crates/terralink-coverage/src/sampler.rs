//! Bearing-by-bearing ray marching with a wall-clock deadline.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use terralink_dem::TerrainProfileProvider;
use terralink_geo::GeoPoint;
use terralink_link::{assess_profile, LinkBudgetError, LinkBudgetParams, RadioParams};
use terralink_metrics::metric_defs;
use tokio::task::JoinSet;
use tracing::{debug, info, trace, warn};

use crate::estimate::{estimate_coverage_radius, fallback_polygon, point_at};
use crate::{CoverageConfig, CoverageError, MAX_BEARINGS, MAX_RAY_STEPS};

/// How a coverage point was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PointSource {
    /// Every accepted step had a terrain profile.
    Modeled,
    /// At least one accepted step used the distance estimate because terrain
    /// was unavailable.
    StepEstimate,
    /// The deadline passed before the bearing was marched.
    DeadlineEstimate,
    /// Part of the synthesized fallback polygon.
    Fallback,
}

/// One vertex of a coverage polygon.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoveragePoint {
    pub lat: f64,
    pub lng: f64,
    /// Degrees clockwise from north.
    pub bearing_deg: f64,
    /// Boundary distance from the transmitter.
    pub distance_km: f64,
    /// Margin at the boundary, when it was modeled.
    pub link_margin_db: Option<f64>,
    pub source: PointSource,
}

impl CoveragePoint {
    /// Point on `bearing_deg` at `distance_km` from `origin`.
    pub fn new(
        origin: GeoPoint,
        bearing_deg: f64,
        distance_km: f64,
        link_margin_db: Option<f64>,
        source: PointSource,
    ) -> Self {
        let at = point_at(origin, bearing_deg, distance_km);
        Self {
            lat: at.lat,
            lng: at.lng,
            bearing_deg,
            distance_km,
            link_margin_db,
            source,
        }
    }
}

/// A coverage polygon and how it was produced.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverageResult {
    pub origin: GeoPoint,
    /// Vertices sorted by bearing. Always at least three.
    pub points: Vec<CoveragePoint>,
    /// Bearings that were ray-marched.
    pub modeled_bearings: usize,
    /// Bearings filled with the closed-form estimate.
    pub estimated_bearings: usize,
    /// The deadline passed before every bearing was marched.
    pub timed_out: bool,
    /// Too few bearings resolved and the points are a synthesized circle.
    pub fallback_polygon: bool,
    /// Radius of the closed-form estimate used for degraded bearings.
    pub estimated_radius_km: f64,
    pub elapsed_ms: f64,
}

impl CoverageResult {
    /// Whether every point came from terrain modeling.
    pub fn is_fully_modeled(&self) -> bool {
        self.points.iter().all(|p| p.source == PointSource::Modeled)
    }

    /// Largest boundary distance.
    pub fn max_distance_km(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.distance_km)
            .fold(0.0, f64::max)
    }
}

/// Outcome of marching one bearing.
enum Ray {
    /// The march finished; `None` when not even the first step succeeded.
    Done(Option<CoveragePoint>),
    /// The deadline passed mid-march and the partial boundary was dropped.
    Abandoned,
}

/// Everything one ray march needs, shared by every bearing of a request.
struct RayMarch<P: ?Sized> {
    provider: Arc<P>,
    origin: GeoPoint,
    tx: RadioParams,
    rx: RadioParams,
    link: LinkBudgetParams,
    config: CoverageConfig,
    max_range_km: f64,
    estimate_km: f64,
    deadline: Instant,
}

impl<P: TerrainProfileProvider + ?Sized> RayMarch<P> {
    /// March outward along `bearing_deg` until a step fails.
    ///
    /// The deadline is checked before every terrain lookup, so a march left
    /// running after the request gave up issues at most one more lookup.
    fn march(&self, bearing_deg: f64) -> Ray {
        let step_km = self.config.step_km;
        let mut last_good_km = 0.0;
        let mut last_margin = None;
        let mut estimated = false;

        for step in 1..=ray_steps(self.max_range_km, step_km) {
            if Instant::now() >= self.deadline {
                trace!(bearing = bearing_deg, step, "Ray abandoned at deadline");
                return Ray::Abandoned;
            }
            let distance = step_km * step as f64;
            let target = point_at(self.origin, bearing_deg, distance);
            let samples = self.config.step_samples(distance);

            let assessed = self
                .provider
                .profile(self.origin, target, samples)
                .map_err(|e| e.to_string())
                .and_then(|profile| {
                    assess_profile(&profile, distance, &self.tx, &self.rx, &self.link)
                        .map_err(|e| e.to_string())
                });

            match assessed {
                Ok(assessment) => {
                    let margin = assessment.budget.link_margin_db;
                    trace!(bearing = bearing_deg, distance_km = distance, margin_db = margin, "Ray step");
                    if margin < self.config.min_link_margin_db {
                        break;
                    }
                    last_good_km = distance;
                    last_margin = Some(margin);
                }
                Err(error) => {
                    trace!(bearing = bearing_deg, distance_km = distance, %error, "Step without terrain");
                    if distance > self.estimate_km {
                        break;
                    }
                    last_good_km = distance;
                    last_margin = None;
                    estimated = true;
                }
            }
        }

        if last_good_km <= 0.0 {
            return Ray::Done(None);
        }
        let source = if estimated {
            PointSource::StepEstimate
        } else {
            PointSource::Modeled
        };
        Ray::Done(Some(CoveragePoint::new(
            self.origin,
            bearing_deg,
            last_good_km,
            last_margin,
            source,
        )))
    }
}

/// Generates coverage polygons over a terrain provider.
///
/// Bearings are marched in batches of `batch_size` on the blocking thread
/// pool. Once the deadline passes, bearings still in flight are abandoned
/// and every unfinished bearing gets the closed-form radius.
pub struct CoverageSampler<P: ?Sized> {
    provider: Arc<P>,
    config: CoverageConfig,
    link: LinkBudgetParams,
    tx: RadioParams,
    rx: RadioParams,
}

impl<P: TerrainProfileProvider + ?Sized + 'static> CoverageSampler<P> {
    /// Sampler with default link parameters and radios.
    pub fn new(provider: Arc<P>, config: CoverageConfig) -> Self {
        Self {
            provider,
            config,
            link: LinkBudgetParams::default(),
            tx: RadioParams::default(),
            rx: RadioParams::default(),
        }
    }

    /// Use these link budget parameters.
    pub fn with_link_params(mut self, link: LinkBudgetParams) -> Self {
        self.link = link;
        self
    }

    /// Use these radios. The transmitter's power is replaced per request.
    pub fn with_radios(mut self, tx: RadioParams, rx: RadioParams) -> Self {
        self.tx = tx;
        self.rx = rx;
        self
    }

    /// The sampler settings.
    pub fn config(&self) -> &CoverageConfig {
        &self.config
    }

    /// Coverage at the configured resolution and range.
    pub async fn generate(
        &self,
        origin: GeoPoint,
        power_w: f64,
    ) -> Result<CoverageResult, CoverageError> {
        self.generate_coverage_polygon(
            origin,
            power_w,
            self.config.resolution_deg,
            self.config.max_range_km,
        )
        .await
    }

    /// Coverage boundary around `origin` for a transmitter of `power_w`.
    pub async fn generate_coverage_polygon(
        &self,
        origin: GeoPoint,
        power_w: f64,
        resolution_deg: f64,
        max_range_km: f64,
    ) -> Result<CoverageResult, CoverageError> {
        origin.validate()?;
        self.validate(power_w, resolution_deg, max_range_km)?;

        let started = Instant::now();
        let deadline = started + self.config.deadline;
        let bearings = bearings(resolution_deg);
        let estimate_km =
            estimate_coverage_radius(power_w, self.config.terrain_factor, max_range_km);

        let march = Arc::new(RayMarch {
            provider: Arc::clone(&self.provider),
            origin,
            tx: self.tx.clone().with_tx_power_w(power_w),
            rx: self.rx.clone(),
            link: self.link.clone(),
            config: self.config.clone(),
            max_range_km,
            estimate_km,
            deadline,
        });

        debug!(
            %origin,
            power_w,
            bearings = bearings.len(),
            max_range_km,
            estimate_km,
            "Generating coverage"
        );

        // Bearing index -> march outcome. Missing entries never finished.
        let mut finished: BTreeMap<usize, Option<CoveragePoint>> = BTreeMap::new();
        let mut timed_out = false;
        let batch_size = self.config.batch_size.max(1);

        'batches: for (batch_no, batch) in bearings.chunks(batch_size).enumerate() {
            if Instant::now() >= deadline {
                timed_out = true;
                break;
            }
            let mut tasks = JoinSet::new();
            for (offset, &bearing) in batch.iter().enumerate() {
                let index = batch_no * batch_size + offset;
                let march = Arc::clone(&march);
                tasks.spawn_blocking(move || (index, march.march(bearing)));
            }

            loop {
                let next = tokio::time::timeout_at(deadline.into(), tasks.join_next()).await;
                match next {
                    Ok(Some(Ok((index, Ray::Done(point))))) => {
                        finished.insert(index, point);
                    }
                    Ok(Some(Ok((_, Ray::Abandoned)))) => {
                        timed_out = true;
                    }
                    Ok(Some(Err(e))) => {
                        warn!(error = %e, "Bearing task failed");
                    }
                    Ok(None) => break,
                    Err(_) => {
                        timed_out = true;
                        // Blocking tasks cannot be cancelled. Each stops at its
                        // next deadline check and its result is dropped.
                        tasks.detach_all();
                        break 'batches;
                    }
                }
            }
        }

        let modeled_bearings = finished.len();
        let mut points = Vec::with_capacity(bearings.len());
        for (index, &bearing) in bearings.iter().enumerate() {
            match finished.remove(&index) {
                Some(Some(point)) => points.push(point),
                Some(None) => {}
                None => points.push(CoveragePoint::new(
                    origin,
                    bearing,
                    estimate_km,
                    None,
                    PointSource::DeadlineEstimate,
                )),
            }
        }
        let estimated_bearings = bearings.len() - modeled_bearings;
        points.retain(|p| p.distance_km > 0.0);
        points.sort_by(|a, b| a.bearing_deg.total_cmp(&b.bearing_deg));

        counter!(metric_defs::COVERAGE_BEARINGS_MODELED.name).increment(modeled_bearings as u64);
        counter!(metric_defs::COVERAGE_BEARINGS_ESTIMATED.name)
            .increment(estimated_bearings as u64);
        if timed_out {
            counter!(metric_defs::COVERAGE_DEADLINE_EXPIRED.name).increment(1);
            warn!(
                deadline_ms = self.config.deadline.as_millis() as u64,
                modeled_bearings,
                estimated_bearings,
                "Coverage deadline exceeded, remaining bearings estimated"
            );
        }

        let fallback = points.len() < 3;
        if fallback {
            let radius = self.fallback_radius_km(estimate_km, max_range_km);
            counter!(metric_defs::COVERAGE_FALLBACK_POLYGONS.name).increment(1);
            warn!(
                resolved = points.len(),
                radius_km = radius,
                "Too few coverage points, using fallback polygon"
            );
            points = fallback_polygon(origin, radius);
        }

        let elapsed = started.elapsed();
        histogram!(metric_defs::COVERAGE_DURATION.name).record(elapsed.as_secs_f64() * 1000.0);

        let result = CoverageResult {
            origin,
            points,
            modeled_bearings,
            estimated_bearings,
            timed_out,
            fallback_polygon: fallback,
            estimated_radius_km: estimate_km,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
        };
        info!(
            points = result.points.len(),
            max_distance_km = result.max_distance_km(),
            timed_out,
            fallback_polygon = fallback,
            elapsed_ms = result.elapsed_ms,
            "Coverage generated"
        );
        Ok(result)
    }

    fn validate(
        &self,
        power_w: f64,
        resolution_deg: f64,
        max_range_km: f64,
    ) -> Result<(), CoverageError> {
        if !power_w.is_finite() || power_w <= 0.0 {
            return Err(CoverageError::InvalidInput(format!(
                "power must be positive, got {} W",
                power_w
            )));
        }
        if !resolution_deg.is_finite() || resolution_deg <= 0.0 || resolution_deg > 360.0 {
            return Err(CoverageError::InvalidInput(format!(
                "resolution must be in (0, 360] degrees, got {}",
                resolution_deg
            )));
        }
        if bearing_count(resolution_deg) > MAX_BEARINGS as f64 {
            return Err(CoverageError::InvalidInput(format!(
                "resolution {} degrees gives more than {} bearings",
                resolution_deg, MAX_BEARINGS
            )));
        }
        if !max_range_km.is_finite() || max_range_km <= 0.0 {
            return Err(CoverageError::InvalidInput(format!(
                "maximum range must be positive, got {} km",
                max_range_km
            )));
        }
        let step_km = self.config.step_km;
        if !step_km.is_finite() || step_km <= 0.0 {
            return Err(CoverageError::InvalidInput(format!(
                "step must be positive, got {} km",
                step_km
            )));
        }
        if ((max_range_km + RANGE_EPSILON_KM) / step_km).floor() > MAX_RAY_STEPS as f64 {
            return Err(CoverageError::InvalidInput(format!(
                "{} km in {} km steps exceeds {} steps per ray",
                max_range_km, step_km, MAX_RAY_STEPS
            )));
        }
        self.tx
            .clone()
            .with_tx_power_w(power_w)
            .validate("transmitter")
            .and_then(|()| self.rx.validate("receiver"))
            .map_err(|e| match e {
                LinkBudgetError::InvalidInput(reason) => CoverageError::InvalidInput(reason),
                other => CoverageError::InvalidInput(other.to_string()),
            })
    }

    fn fallback_radius_km(&self, estimate_km: f64, max_range_km: f64) -> f64 {
        let radius = if self.config.fallback_radius_km > 0.0 {
            self.config.fallback_radius_km
        } else {
            estimate_km
        };
        radius.min(max_range_km)
    }
}

/// Slack on the maximum range so a whole number of steps reaches it exactly.
const RANGE_EPSILON_KM: f64 = 1e-9;

/// Number of bearings `0, r, 2r, ...` below 360 degrees, unbounded.
fn bearing_count(resolution_deg: f64) -> f64 {
    ((360.0 - 1e-9) / resolution_deg).ceil()
}

/// Steps a ray takes to reach `max_range_km`.
fn ray_steps(max_range_km: f64, step_km: f64) -> usize {
    let steps = ((max_range_km + RANGE_EPSILON_KM) / step_km).floor();
    if steps.is_finite() && steps > 0.0 {
        (steps as usize).min(MAX_RAY_STEPS)
    } else {
        0
    }
}

/// Bearings `0, r, 2r, ...` below 360 degrees.
///
/// Never returns more than [`MAX_BEARINGS`] bearings; coverage requests
/// with a finer resolution are rejected.
pub fn bearings(resolution_deg: f64) -> Vec<f64> {
    let count = bearing_count(resolution_deg);
    if count.is_nan() || count <= 0.0 {
        return Vec::new();
    }
    let count = count.min(MAX_BEARINGS as f64) as usize;
    (0..count).map(|i| i as f64 * resolution_deg).collect()
}
