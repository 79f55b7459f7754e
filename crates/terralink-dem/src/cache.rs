//! Elevation caching.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::counter;
use parking_lot::Mutex;
use terralink_geo::GeoPoint;
use terralink_metrics::metric_defs;
use tracing::trace;

use crate::{ElevationSource, Result};

/// Coordinates quantized to five decimal places (about 1.1 m of latitude).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    lat_e5: i64,
    lng_e5: i64,
}

impl CacheKey {
    const SCALE: f64 = 1e5;

    /// Quantize a point.
    pub fn from_point(point: GeoPoint) -> Self {
        Self {
            lat_e5: (point.lat * Self::SCALE).round() as i64,
            lng_e5: (point.lng * Self::SCALE).round() as i64,
        }
    }
}

impl From<GeoPoint> for CacheKey {
    fn from(point: GeoPoint) -> Self {
        Self::from_point(point)
    }
}

/// Storage for elevations keyed by quantized coordinates.
///
/// Implementations are shared between threads and must be internally
/// synchronized.
pub trait ElevationCache: Send + Sync {
    /// Look up a live entry.
    fn get(&self, key: &CacheKey) -> Option<f64>;

    /// Store `value` for `ttl`.
    fn set(&self, key: CacheKey, value: f64, ttl: Duration);

    /// Number of stored entries, expired ones included until they are evicted.
    fn len(&self) -> usize;

    /// Whether the cache holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<C: ElevationCache + ?Sized> ElevationCache for Arc<C> {
    fn get(&self, key: &CacheKey) -> Option<f64> {
        (**self).get(key)
    }

    fn set(&self, key: CacheKey, value: f64, ttl: Duration) {
        (**self).set(key, value, ttl)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

#[derive(Debug)]
struct Entry {
    value: f64,
    expires_at: Instant,
    /// Matches the `order` slot that owns this entry.
    generation: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<CacheKey, Entry>,
    /// Insertion order, oldest at the front. Slots whose generation no
    /// longer matches the entry are stale and skipped.
    order: VecDeque<(CacheKey, u64)>,
    next_generation: u64,
}

impl Inner {
    fn is_live(&self, key: &CacheKey, generation: u64) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.generation == generation)
    }

    /// Remove the oldest live entry. Returns false when none is left.
    fn evict_oldest(&mut self) -> bool {
        while let Some((key, generation)) = self.order.pop_front() {
            if self.is_live(&key, generation) {
                self.entries.remove(&key);
                return true;
            }
        }
        false
    }

    /// Drop stale slots once they outnumber the live ones.
    fn compact(&mut self) {
        if self.order.len() > 2 * self.entries.len().max(16) {
            let entries = &self.entries;
            self.order.retain(|(key, generation)| {
                entries
                    .get(key)
                    .is_some_and(|entry| entry.generation == *generation)
            });
        }
    }
}

/// In-memory cache with per-entry TTL and a size bound.
///
/// When full, the oldest inserted entry is evicted. Re-setting a key moves it
/// to the back of the insertion order. A capacity of 0 disables storage.
#[derive(Debug)]
pub struct MemoryElevationCache {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl MemoryElevationCache {
    /// Create a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity,
        }
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }
}

impl ElevationCache for MemoryElevationCache {
    fn get(&self, key: &CacheKey) -> Option<f64> {
        let mut inner = self.inner.lock();
        let (value, expires_at) = {
            let entry = inner.entries.get(key)?;
            (entry.value, entry.expires_at)
        };
        if Instant::now() >= expires_at {
            inner.entries.remove(key);
            inner.compact();
            return None;
        }
        Some(value)
    }

    fn set(&self, key: CacheKey, value: f64, ttl: Duration) {
        if self.capacity == 0 {
            return;
        }
        let expires_at = Instant::now() + ttl;
        let mut inner = self.inner.lock();

        inner.entries.remove(&key);
        while inner.entries.len() >= self.capacity {
            if !inner.evict_oldest() {
                break;
            }
        }
        let generation = inner.next_generation;
        inner.next_generation += 1;
        inner.entries.insert(
            key,
            Entry {
                value,
                expires_at,
                generation,
            },
        );
        inner.order.push_back((key, generation));
        inner.compact();
    }

    fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }
}

/// An [`ElevationSource`] that serves repeated points from a cache.
///
/// Only cache misses are forwarded to the wrapped source, in one call, and
/// their results are stored for `ttl`.
#[derive(Debug)]
pub struct CachedElevationSource<S, C> {
    source: S,
    cache: C,
    ttl: Duration,
}

impl<S: ElevationSource, C: ElevationCache> CachedElevationSource<S, C> {
    /// Wrap `source` with `cache`.
    pub fn new(source: S, cache: C, ttl: Duration) -> Self {
        Self { source, cache, ttl }
    }

    /// The cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// The wrapped source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: ElevationSource, C: ElevationCache> ElevationSource for CachedElevationSource<S, C> {
    fn elevations(&self, points: &[GeoPoint]) -> Result<Vec<f64>> {
        let keys: Vec<CacheKey> = points.iter().copied().map(CacheKey::from_point).collect();
        let mut out: Vec<Option<f64>> = keys.iter().map(|k| self.cache.get(k)).collect();

        let missing: Vec<usize> = out
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.is_none().then_some(i))
            .collect();

        let hits = points.len() - missing.len();
        counter!(metric_defs::ELEVATION_CACHE_HITS.name).increment(hits as u64);
        counter!(metric_defs::ELEVATION_CACHE_MISSES.name).increment(missing.len() as u64);
        trace!(hits, misses = missing.len(), "Elevation cache lookup");

        if !missing.is_empty() {
            let miss_points: Vec<GeoPoint> = missing.iter().map(|&i| points[i]).collect();
            let fetched = self.source.elevations(&miss_points)?;
            for (&i, value) in missing.iter().zip(fetched) {
                self.cache.set(keys[i], value, self.ttl);
                out[i] = Some(value);
            }
        }

        // A short answer from the source leaves holes; report them as a count mismatch.
        let filled = out.iter().filter(|v| v.is_some()).count();
        if filled != points.len() {
            return Err(crate::DemError::SampleCountMismatch {
                expected: points.len(),
                actual: filled,
            });
        }
        Ok(out.into_iter().flatten().collect())
    }

    fn name(&self) -> &str {
        self.source.name()
    }
}
