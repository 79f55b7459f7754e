//! Metric definitions for terralink.
//!
//! Every metric the planner emits is declared once as a [`Metric`] constant in
//! [`metric_defs`], so call sites never spell a metric name by hand. The
//! `metrics` crate is re-exported for convenience. Nothing is recorded unless
//! the host process installs a recorder; with the `prometheus` feature,
//! [`install_prometheus_exporter`] installs one.
//!
//! ```rust
//! use terralink_metrics::{metric_defs, Metric, MetricKind};
//!
//! assert_eq!(metric_defs::LINK_COMPUTATIONS.kind, MetricKind::Counter);
//! metrics::counter!(metric_defs::LINK_COMPUTATIONS.name).increment(1);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

/// The kind of metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A gauge that can go up and down.
    Gauge,
    /// A histogram for recording distributions.
    Histogram,
}

impl MetricKind {
    /// Returns the kind as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric declaration with its metadata.
///
/// ```rust
/// use terralink_metrics::{Metric, MetricKind};
/// use metrics::Unit;
///
/// const PINGS: Metric = Metric::counter("terralink.example.pings")
///     .with_description("Pings sent")
///     .with_unit(Unit::Count)
///     .with_labels(&["bearing"]);
///
/// assert_eq!(PINGS.kind, MetricKind::Counter);
/// ```
#[derive(Debug, Clone)]
pub struct Metric {
    /// Dotted metric name.
    pub name: &'static str,
    /// Counter, gauge or histogram.
    pub kind: MetricKind,
    /// Human-readable description.
    pub description: &'static str,
    /// Unit of measurement, if any.
    pub unit: Option<Unit>,
    /// Label keys attached at the call sites.
    pub labels: &'static [&'static str],
}

impl Metric {
    const fn new(name: &'static str, kind: MetricKind) -> Self {
        Self {
            name,
            kind,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Declare a counter.
    pub const fn counter(name: &'static str) -> Self {
        Self::new(name, MetricKind::Counter)
    }

    /// Declare a gauge.
    pub const fn gauge(name: &'static str) -> Self {
        Self::new(name, MetricKind::Gauge)
    }

    /// Declare a histogram.
    pub const fn histogram(name: &'static str) -> Self {
        Self::new(name, MetricKind::Histogram)
    }

    /// Set the description.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Set the unit.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Set the label keys.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Register this metric's description with the installed recorder.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => {
                describe_counter!(self.name, unit, self.description);
            }
            (MetricKind::Counter, None) => {
                describe_counter!(self.name, self.description);
            }
            (MetricKind::Gauge, Some(unit)) => {
                describe_gauge!(self.name, unit, self.description);
            }
            (MetricKind::Gauge, None) => {
                describe_gauge!(self.name, self.description);
            }
            (MetricKind::Histogram, Some(unit)) => {
                describe_histogram!(self.name, unit, self.description);
            }
            (MetricKind::Histogram, None) => {
                describe_histogram!(self.name, self.description);
            }
        }
    }

    /// The unit as a short string, empty when unset.
    pub fn unit_str(&self) -> &'static str {
        match self.unit {
            Some(unit) => unit.as_str(),
            None => "",
        }
    }
}

/// Every metric emitted by the planner.
pub mod metric_defs {
    use super::{Metric, Unit};

    // ========================================================================
    // Elevation lookups
    // ========================================================================

    /// Elevation batches requested from a backend.
    ///
    /// Labels: source
    pub const ELEVATION_REQUESTS: Metric = Metric::counter("terralink.elevation.requests")
        .with_description("Elevation batches requested from a backend")
        .with_unit(Unit::Count)
        .with_labels(&["source"]);

    /// Elevation batches that failed.
    ///
    /// Labels: source, reason
    pub const ELEVATION_FAILURES: Metric = Metric::counter("terralink.elevation.failures")
        .with_description("Elevation batches that failed")
        .with_unit(Unit::Count)
        .with_labels(&["source", "reason"]);

    pub const ELEVATION_REQUEST_DURATION: Metric =
        Metric::histogram("terralink.elevation.request_duration_ms")
            .with_description("Wall time of one elevation batch request")
            .with_unit(Unit::Milliseconds)
            .with_labels(&["source"]);

    pub const ELEVATION_CACHE_HITS: Metric = Metric::counter("terralink.elevation.cache_hits")
        .with_description("Elevations served from cache")
        .with_unit(Unit::Count);

    pub const ELEVATION_CACHE_MISSES: Metric = Metric::counter("terralink.elevation.cache_misses")
        .with_description("Elevations not found in cache")
        .with_unit(Unit::Count);

    /// Profiles replaced by the flat fallback after a provider error.
    pub const TERRAIN_FLAT_FALLBACKS: Metric = Metric::counter("terralink.terrain.flat_fallbacks")
        .with_description("Profiles replaced by a flat fallback profile")
        .with_unit(Unit::Count);

    // ========================================================================
    // Link budget
    // ========================================================================

    /// Link budgets computed.
    ///
    /// Labels: quality
    pub const LINK_COMPUTATIONS: Metric = Metric::counter("terralink.link.computations")
        .with_description("Link budgets computed")
        .with_unit(Unit::Count)
        .with_labels(&["quality"]);

    pub const LINK_MARGIN: Metric = Metric::histogram("terralink.link.margin_db")
        .with_description("Final link margin in dB");

    // ========================================================================
    // Coverage
    // ========================================================================

    pub const COVERAGE_BEARINGS_MODELED: Metric =
        Metric::counter("terralink.coverage.bearings_modeled")
            .with_description("Bearings resolved by terrain ray-marching")
            .with_unit(Unit::Count);

    pub const COVERAGE_BEARINGS_ESTIMATED: Metric =
        Metric::counter("terralink.coverage.bearings_estimated")
            .with_description("Bearings filled with a closed-form estimate after the deadline")
            .with_unit(Unit::Count);

    pub const COVERAGE_DEADLINE_EXPIRED: Metric =
        Metric::counter("terralink.coverage.deadline_expired")
            .with_description("Coverage runs that hit the wall-clock deadline")
            .with_unit(Unit::Count);

    pub const COVERAGE_FALLBACK_POLYGONS: Metric =
        Metric::counter("terralink.coverage.fallback_polygons")
            .with_description("Coverage runs answered with a synthesized circle")
            .with_unit(Unit::Count);

    pub const COVERAGE_DURATION: Metric = Metric::histogram("terralink.coverage.duration_ms")
        .with_description("Wall time of one coverage run")
        .with_unit(Unit::Milliseconds);

    /// All metrics, for bulk registration.
    pub const ALL: &[&Metric] = &[
        &ELEVATION_REQUESTS,
        &ELEVATION_FAILURES,
        &ELEVATION_REQUEST_DURATION,
        &ELEVATION_CACHE_HITS,
        &ELEVATION_CACHE_MISSES,
        &TERRAIN_FLAT_FALLBACKS,
        &LINK_COMPUTATIONS,
        &LINK_MARGIN,
        &COVERAGE_BEARINGS_MODELED,
        &COVERAGE_BEARINGS_ESTIMATED,
        &COVERAGE_DEADLINE_EXPIRED,
        &COVERAGE_FALLBACK_POLYGONS,
        &COVERAGE_DURATION,
    ];
}

/// Register descriptions for every metric in [`metric_defs::ALL`].
///
/// Call once after installing a recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}

/// Install a Prometheus exporter listening on `addr` and describe all metrics.
#[cfg(feature = "prometheus")]
pub fn install_prometheus_exporter(
    addr: std::net::SocketAddr,
) -> Result<(), metrics_exporter_prometheus::BuildError> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    describe_metrics();
    Ok(())
}
