//! HTTP elevation lookups.
//!
//! Speaks the Open-Elevation lookup protocol, which OpenTopoData and several
//! self-hosted services also accept:
//!
//! ```text
//! POST {url}
//! {"locations": [{"latitude": 45.0, "longitude": -122.0}, ...]}
//!
//! 200 OK
//! {"results": [{"latitude": 45.0, "longitude": -122.0, "elevation": 123.0}, ...]}
//! ```

use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use terralink_geo::GeoPoint;
use terralink_metrics::metric_defs;
use tracing::{debug, warn};

use crate::{DemError, ElevationSource, Result};

#[derive(Debug, Serialize)]
struct LookupRequest {
    locations: Vec<LookupLocation>,
}

#[derive(Debug, Serialize)]
struct LookupLocation {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    results: Vec<LookupResult>,
}

#[derive(Debug, Deserialize)]
struct LookupResult {
    elevation: Option<f64>,
}

impl LookupRequest {
    fn new(points: &[GeoPoint]) -> Self {
        Self {
            locations: points
                .iter()
                .map(|p| LookupLocation {
                    latitude: p.lat,
                    longitude: p.lng,
                })
                .collect(),
        }
    }
}

impl LookupResponse {
    fn into_elevations(self, expected: usize) -> Result<Vec<f64>> {
        if self.results.len() != expected {
            return Err(DemError::SampleCountMismatch {
                expected,
                actual: self.results.len(),
            });
        }
        self.results
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                r.elevation
                    .filter(|e| e.is_finite())
                    .ok_or_else(|| DemError::InvalidResponse(format!("no elevation for point {}", i)))
            })
            .collect()
    }
}

/// Elevation source backed by a JSON lookup API.
#[derive(Debug, Clone)]
pub struct HttpElevationSource {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpElevationSource {
    /// Create a source posting to `url` with a per-request `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("terralink/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// The lookup endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn lookup(&self, points: &[GeoPoint]) -> Result<Vec<f64>> {
        let response = self
            .client
            .post(&self.url)
            .json(&LookupRequest::new(points))
            .send()?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DemError::RateLimited);
        }
        if !status.is_success() {
            return Err(DemError::ProviderUnavailable(format!(
                "{} answered HTTP {}",
                self.url, status
            )));
        }

        let body: LookupResponse = response
            .json()
            .map_err(|e| DemError::InvalidResponse(e.to_string()))?;
        body.into_elevations(points.len())
    }
}

impl ElevationSource for HttpElevationSource {
    fn elevations(&self, points: &[GeoPoint]) -> Result<Vec<f64>> {
        if points.is_empty() {
            return Ok(Vec::new());
        }

        counter!(metric_defs::ELEVATION_REQUESTS.name, "source" => "http").increment(1);
        let started = Instant::now();
        let result = self.lookup(points);
        histogram!(metric_defs::ELEVATION_REQUEST_DURATION.name, "source" => "http")
            .record(started.elapsed().as_secs_f64() * 1000.0);

        match &result {
            Ok(_) => debug!(points = points.len(), url = %self.url, "Elevation lookup succeeded"),
            Err(e) => {
                counter!(
                    metric_defs::ELEVATION_FAILURES.name,
                    "source" => "http",
                    "reason" => e.reason()
                )
                .increment(1);
                warn!(points = points.len(), url = %self.url, error = %e, "Elevation lookup failed");
            }
        }
        result
    }

    fn name(&self) -> &str {
        "http"
    }
}
