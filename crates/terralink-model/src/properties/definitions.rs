//! Property constants, grouped by namespace.
//!
//! Defaults describe a 1 W, 915 MHz LoRa node with a 3 dBi antenna on a
//! 10 m mast.

use super::types::{EndpointScope, PlannerScope, Property, PropertyDef, PropertyDefault};

// ============================================================================
// Radio (per endpoint)
// ============================================================================

/// Transmit power at the radio connector.
pub const RADIO_TX_POWER_W: Property<f64, EndpointScope> = Property::new(
    "radio/tx_power_w",
    "Transmit power",
    PropertyDefault::Float(1.0),
)
.with_unit("W")
.with_aliases(&["radio/power_w"])
.with_minimum(0.0);

/// Antenna gain.
pub const RADIO_ANTENNA_GAIN_DBI: Property<f64, EndpointScope> = Property::new(
    "radio/antenna_gain_dbi",
    "Antenna gain",
    PropertyDefault::Float(3.0),
)
.with_unit("dBi");

/// Antenna height above ground.
pub const RADIO_ANTENNA_HEIGHT_M: Property<f64, EndpointScope> = Property::new(
    "radio/antenna_height_m",
    "Antenna height above local ground",
    PropertyDefault::Float(10.0),
)
.with_unit("m")
.with_minimum(0.0);

/// Feedline loss between radio and antenna.
pub const RADIO_CABLE_LOSS_DB: Property<f64, EndpointScope> = Property::new(
    "radio/cable_loss_db",
    "Feedline (cable) loss",
    PropertyDefault::Float(1.5),
)
.with_unit("dB")
.with_minimum(0.0);

/// Combined connector loss.
pub const RADIO_CONNECTOR_LOSS_DB: Property<f64, EndpointScope> = Property::new(
    "radio/connector_loss_db",
    "Combined connector loss",
    PropertyDefault::Float(0.5),
)
.with_unit("dB")
.with_minimum(0.0);

/// Carrier frequency.
pub const RADIO_FREQUENCY_HZ: Property<u64, EndpointScope> = Property::new(
    "radio/frequency_hz",
    "Carrier frequency",
    PropertyDefault::Integer(915_000_000),
)
.with_unit("Hz")
.with_minimum(1.0e6);

/// Receiver sensitivity at SF7.
pub const RADIO_SENSITIVITY_SF7_DBM: Property<f64, EndpointScope> = Property::new(
    "radio/sensitivity_sf7_dbm",
    "Receiver sensitivity at spreading factor 7",
    PropertyDefault::Float(-123.0),
)
.with_unit("dBm");

/// Receiver sensitivity at SF8.
pub const RADIO_SENSITIVITY_SF8_DBM: Property<f64, EndpointScope> = Property::new(
    "radio/sensitivity_sf8_dbm",
    "Receiver sensitivity at spreading factor 8",
    PropertyDefault::Float(-126.0),
)
.with_unit("dBm");

/// Receiver sensitivity at SF9.
pub const RADIO_SENSITIVITY_SF9_DBM: Property<f64, EndpointScope> = Property::new(
    "radio/sensitivity_sf9_dbm",
    "Receiver sensitivity at spreading factor 9",
    PropertyDefault::Float(-129.0),
)
.with_unit("dBm");

/// Receiver sensitivity at SF10.
pub const RADIO_SENSITIVITY_SF10_DBM: Property<f64, EndpointScope> = Property::new(
    "radio/sensitivity_sf10_dbm",
    "Receiver sensitivity at spreading factor 10",
    PropertyDefault::Float(-132.0),
)
.with_unit("dBm");

/// Receiver sensitivity at SF11.
pub const RADIO_SENSITIVITY_SF11_DBM: Property<f64, EndpointScope> = Property::new(
    "radio/sensitivity_sf11_dbm",
    "Receiver sensitivity at spreading factor 11",
    PropertyDefault::Float(-134.5),
)
.with_unit("dBm");

/// Receiver sensitivity at SF12.
pub const RADIO_SENSITIVITY_SF12_DBM: Property<f64, EndpointScope> = Property::new(
    "radio/sensitivity_sf12_dbm",
    "Receiver sensitivity at spreading factor 12",
    PropertyDefault::Float(-137.0),
)
.with_unit("dBm");

// ============================================================================
// Link budget
// ============================================================================

pub const LINK_FADE_MARGIN_DB: Property<f64, PlannerScope> = Property::new(
    "link/fade_margin_db",
    "Fade margin subtracted from every link margin",
    PropertyDefault::Float(10.0),
)
.with_unit("dB");

/// One of "rural", "suburban" or "urban". Anything else is treated as suburban.
pub const LINK_ENVIRONMENT: Property<String, PlannerScope> = Property::new(
    "link/environment",
    "Deployment environment used for spreading factor selection",
    PropertyDefault::Text("suburban"),
);

pub const LINK_TERRAIN_SAMPLES: Property<usize, PlannerScope> = Property::new(
    "link/terrain_samples",
    "Terrain samples requested per point-to-point profile",
    PropertyDefault::Integer(64),
)
.with_minimum(2.0);

pub const LINK_MARGIN_EXCELLENT_DB: Property<f64, PlannerScope> = Property::new(
    "link/margin_excellent_db",
    "Minimum margin rated excellent",
    PropertyDefault::Float(15.0),
)
.with_unit("dB");

pub const LINK_MARGIN_GOOD_DB: Property<f64, PlannerScope> = Property::new(
    "link/margin_good_db",
    "Minimum margin rated good",
    PropertyDefault::Float(5.0),
)
.with_unit("dB");

pub const LINK_MARGIN_POOR_DB: Property<f64, PlannerScope> = Property::new(
    "link/margin_poor_db",
    "Margins below this are rated poor",
    PropertyDefault::Float(-5.0),
)
.with_unit("dB");

// ============================================================================
// Coverage
// ============================================================================

pub const COVERAGE_RESOLUTION_DEG: Property<f64, PlannerScope> = Property::new(
    "coverage/resolution_deg",
    "Angular spacing between coverage bearings",
    PropertyDefault::Float(15.0),
)
.with_unit("deg");

pub const COVERAGE_MAX_RANGE_KM: Property<f64, PlannerScope> = Property::new(
    "coverage/max_range_km",
    "Farthest distance marched along any bearing",
    PropertyDefault::Float(20.0),
)
.with_unit("km")
.with_minimum(0.0);

pub const COVERAGE_STEP_KM: Property<f64, PlannerScope> = Property::new(
    "coverage/step_km",
    "Ray-march step length",
    PropertyDefault::Float(0.5),
)
.with_unit("km");

pub const COVERAGE_MIN_LINK_MARGIN_DB: Property<f64, PlannerScope> = Property::new(
    "coverage/min_link_margin_db",
    "Margin a step must reach to extend the boundary",
    PropertyDefault::Float(10.0),
)
.with_unit("dB");

pub const COVERAGE_BATCH_SIZE: Property<usize, PlannerScope> = Property::new(
    "coverage/batch_size",
    "Bearings ray-marched concurrently",
    PropertyDefault::Integer(6),
)
.with_minimum(1.0);

pub const COVERAGE_DEADLINE_S: Property<f64, PlannerScope> = Property::new(
    "coverage/deadline_s",
    "Wall-clock budget for one coverage polygon",
    PropertyDefault::Float(8.0),
)
.with_unit("s")
.with_minimum(0.0);

pub const COVERAGE_SAMPLES_PER_KM: Property<usize, PlannerScope> = Property::new(
    "coverage/samples_per_km",
    "Terrain samples per kilometre of ray-march profile",
    PropertyDefault::Integer(10),
)
.with_minimum(1.0);

pub const COVERAGE_TERRAIN_FACTOR: Property<f64, PlannerScope> = Property::new(
    "coverage/terrain_factor",
    "Scale applied to closed-form coverage estimates",
    PropertyDefault::Float(1.0),
)
.with_minimum(0.0);

pub const COVERAGE_FALLBACK_RADIUS_KM: Property<f64, PlannerScope> = Property::new(
    "coverage/fallback_radius_km",
    "Radius of the synthesized circle when too few bearings resolve",
    PropertyDefault::Float(2.0),
)
.with_unit("km")
.with_minimum(0.0);

// ============================================================================
// Elevation source
// ============================================================================

/// "http" for the lookup API, "flat" for a constant-elevation provider.
pub const ELEVATION_SOURCE: Property<String, PlannerScope> = Property::new(
    "elevation/source",
    "Elevation backend",
    PropertyDefault::Text("http"),
);

pub const ELEVATION_API_URL: Property<String, PlannerScope> = Property::new(
    "elevation/api_url",
    "Elevation lookup endpoint",
    PropertyDefault::Text("https://api.open-elevation.com/api/v1/lookup"),
)
.with_aliases(&["elevation/url"]);

pub const ELEVATION_BATCH_SIZE: Property<usize, PlannerScope> = Property::new(
    "elevation/batch_size",
    "Points per elevation request",
    PropertyDefault::Integer(100),
)
.with_minimum(1.0);

pub const ELEVATION_CONCURRENCY: Property<usize, PlannerScope> = Property::new(
    "elevation/concurrency",
    "Elevation requests in flight at once",
    PropertyDefault::Integer(4),
)
.with_minimum(1.0);

pub const ELEVATION_TIMEOUT_S: Property<f64, PlannerScope> = Property::new(
    "elevation/timeout_s",
    "Per-request HTTP timeout",
    PropertyDefault::Float(10.0),
)
.with_unit("s")
.with_minimum(0.0);

pub const ELEVATION_FALLBACK_M: Property<f64, PlannerScope> = Property::new(
    "elevation/fallback_elevation_m",
    "Ground elevation of the flat profile used when lookups fail",
    PropertyDefault::Float(100.0),
)
.with_unit("m");

pub const ELEVATION_CACHE_TTL_S: Property<f64, PlannerScope> = Property::new(
    "elevation/cache_ttl_s",
    "Lifetime of a cached elevation",
    PropertyDefault::Float(3600.0),
)
.with_unit("s")
.with_minimum(0.0);

pub const ELEVATION_CACHE_CAPACITY: Property<usize, PlannerScope> = Property::new(
    "elevation/cache_capacity",
    "Maximum cached elevations (0 disables the cache)",
    PropertyDefault::Integer(10_000),
);

// ============================================================================
// Registry
// ============================================================================

/// Every property, in declaration order.
pub const ALL: &[PropertyDef] = &[
    RADIO_TX_POWER_W.def,
    RADIO_ANTENNA_GAIN_DBI.def,
    RADIO_ANTENNA_HEIGHT_M.def,
    RADIO_CABLE_LOSS_DB.def,
    RADIO_CONNECTOR_LOSS_DB.def,
    RADIO_FREQUENCY_HZ.def,
    RADIO_SENSITIVITY_SF7_DBM.def,
    RADIO_SENSITIVITY_SF8_DBM.def,
    RADIO_SENSITIVITY_SF9_DBM.def,
    RADIO_SENSITIVITY_SF10_DBM.def,
    RADIO_SENSITIVITY_SF11_DBM.def,
    RADIO_SENSITIVITY_SF12_DBM.def,
    LINK_FADE_MARGIN_DB.def,
    LINK_ENVIRONMENT.def,
    LINK_TERRAIN_SAMPLES.def,
    LINK_MARGIN_EXCELLENT_DB.def,
    LINK_MARGIN_GOOD_DB.def,
    LINK_MARGIN_POOR_DB.def,
    COVERAGE_RESOLUTION_DEG.def,
    COVERAGE_MAX_RANGE_KM.def,
    COVERAGE_STEP_KM.def,
    COVERAGE_MIN_LINK_MARGIN_DB.def,
    COVERAGE_BATCH_SIZE.def,
    COVERAGE_DEADLINE_S.def,
    COVERAGE_SAMPLES_PER_KM.def,
    COVERAGE_TERRAIN_FACTOR.def,
    COVERAGE_FALLBACK_RADIUS_KM.def,
    ELEVATION_SOURCE.def,
    ELEVATION_API_URL.def,
    ELEVATION_BATCH_SIZE.def,
    ELEVATION_CONCURRENCY.def,
    ELEVATION_TIMEOUT_S.def,
    ELEVATION_FALLBACK_M.def,
    ELEVATION_CACHE_TTL_S.def,
    ELEVATION_CACHE_CAPACITY.def,
];
