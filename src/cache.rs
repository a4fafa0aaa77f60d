//! Bounded in-memory TTL cache.
//!
//! The cache is the only cross-request state in the pipeline. Each entry
//! carries its own expiry; a read at or after expiry is treated as absent
//! and the entry is dropped. The store is capacity-bounded with
//! least-recently-used eviction, so a long-running process cannot grow it
//! without limit.
//!
//! There is no invalidation beyond expiry: writes overwrite
//! unconditionally, and a duplicate upstream fetch caused by two requests
//! missing at once resolves as last-write-wins.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::model::Coordinate;

/// TTL for cached current conditions.
pub const CURRENT_TTL: Duration = Duration::from_secs(10 * 60);

/// TTL for cached aggregated forecasts.
pub const FORECAST_TTL: Duration = Duration::from_secs(60 * 60);

/// TTL for cached geocoding results.
pub const GEOCODE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default maximum number of entries per cache.
pub const DEFAULT_CAPACITY: usize = 1024;

struct Entry<V> {
    value: V,
    expires_at: Instant,
    last_used: u64,
}

struct Inner<V> {
    capacity: usize,
    // Monotonic access counter; higher = more recently used.
    tick: u64,
    entries: HashMap<String, Entry<V>>,
}

/// A concurrent string-keyed cache with per-entry TTL and LRU eviction.
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct TtlCache<V> {
    inner: Arc<Mutex<Inner<V>>>,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                capacity: capacity.max(1),
                tick: 0,
                entries: HashMap::new(),
            })),
        }
    }

    /// Look up a key, treating expired entries as absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.lock();
        let now = Instant::now();

        let expired = match inner.entries.get(key) {
            Some(entry) => entry.expires_at <= now,
            None => return None,
        };

        if expired {
            inner.entries.remove(key);
            return None;
        }

        inner.tick += 1;
        let tick = inner.tick;
        let entry = inner.entries.get_mut(key)?;
        entry.last_used = tick;
        Some(entry.value.clone())
    }

    /// Insert or overwrite a key with the given TTL.
    pub fn insert(&self, key: &str, value: V, ttl: Duration) {
        let mut inner = self.inner.lock();
        let now = Instant::now();

        if !inner.entries.contains_key(key) && inner.entries.len() >= inner.capacity {
            inner.entries.retain(|_, e| e.expires_at > now);
            if inner.entries.len() >= inner.capacity {
                evict_lru(&mut inner);
            }
        }

        inner.tick += 1;
        let tick = inner.tick;
        inner.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
                last_used: tick,
            },
        );
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn evict_lru<V>(inner: &mut Inner<V>) {
    let victim = inner
        .entries
        .iter()
        .min_by_key(|(_, e)| e.last_used)
        .map(|(k, _)| k.clone());
    if let Some(key) = victim {
        inner.entries.remove(&key);
    }
}

/// Cache key for current conditions at a coordinate.
pub fn current_key(coord: Coordinate) -> String {
    format!("current:{}:{}", coord.latitude, coord.longitude)
}

/// Cache key for the aggregated forecast at a coordinate.
pub fn forecast_key(coord: Coordinate) -> String {
    format!("forecast:{}:{}", coord.latitude, coord.longitude)
}

/// Cache key for a geocoding query, case-normalized with whitespace
/// replaced by underscores.
pub fn geocode_key(city: &str, region: &str, country: &str) -> String {
    format!(
        "geocode:{}:{}:{}",
        normalize(city),
        normalize(region),
        normalize(country)
    )
}

fn normalize(part: &str) -> String {
    part.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}
