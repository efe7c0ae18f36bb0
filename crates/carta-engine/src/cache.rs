//! Injectable matrix cache.
//!
//! Builds are pure functions of their inputs and the published snapshot, so a
//! finished matrix can be reused for an identical request. The cache is the
//! only state shared between builds.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use carta_config::EngineConfig;
use carta_core::Snapshot;
use carta_core::entities::BenchmarkSelector;
use carta_core::enums::FacilityType;
use carta_core::matrix::ComparisonMatrix;
use tokio::time::Instant;

/// Everything a matrix depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub focal_facility_id: String,
    /// `f64::to_bits` of the radius.
    pub radius_bits: u64,
    pub facility_type: Option<FacilityType>,
    /// Effective snapshot, never "latest".
    pub snapshot: Snapshot,
    /// Effective column codes, in order.
    pub measures: Vec<String>,
    pub benchmark: Option<BenchmarkSelector>,
}

pub trait MatrixCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<ComparisonMatrix>;

    fn put(&self, key: CacheKey, matrix: ComparisonMatrix);
}

impl<T: MatrixCache + ?Sized> MatrixCache for Box<T> {
    fn get(&self, key: &CacheKey) -> Option<ComparisonMatrix> {
        (**self).get(key)
    }

    fn put(&self, key: CacheKey, matrix: ComparisonMatrix) {
        (**self).put(key, matrix);
    }
}

impl<T: MatrixCache + ?Sized> MatrixCache for Arc<T> {
    fn get(&self, key: &CacheKey) -> Option<ComparisonMatrix> {
        (**self).get(key)
    }

    fn put(&self, key: CacheKey, matrix: ComparisonMatrix) {
        (**self).put(key, matrix);
    }
}

/// Cache that never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl MatrixCache for NoopCache {
    fn get(&self, _key: &CacheKey) -> Option<ComparisonMatrix> {
        None
    }

    fn put(&self, _key: CacheKey, _matrix: ComparisonMatrix) {}
}

struct Entry {
    matrix: ComparisonMatrix,
    inserted: Instant,
}

/// Bounded cache whose entries expire `ttl` after insertion.
///
/// When full, expired entries are dropped first, then the oldest entry.
pub struct TtlCache {
    ttl: Duration,
    capacity: usize,
    entries: Mutex<HashMap<CacheKey, Entry>>,
}

impl TtlCache {
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.cache_ttl(), config.cache_capacity)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn expired(&self, entry: &Entry, now: Instant) -> bool {
        now.duration_since(entry.inserted) >= self.ttl
    }
}

impl MatrixCache for TtlCache {
    fn get(&self, key: &CacheKey) -> Option<ComparisonMatrix> {
        let now = Instant::now();
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if !self.expired(entry, now) => Some(entry.matrix.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: CacheKey, matrix: ComparisonMatrix) {
        let now = Instant::now();
        let mut entries = self.lock();
        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            entries.retain(|_, e| !self.expired(e, now));
            if entries.len() >= self.capacity
                && let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, e)| e.inserted)
                    .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest);
            }
        }
        entries.insert(
            key,
            Entry {
                matrix,
                inserted: now,
            },
        );
    }
}

/// Cache chosen by configuration: TTL-bounded when enabled, otherwise none.
#[must_use]
pub fn cache_from_config(config: &EngineConfig) -> Box<dyn MatrixCache> {
    if config.cache_enabled() {
        Box::new(TtlCache::from_config(config))
    } else {
        Box::new(NoopCache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(focal: &str) -> CacheKey {
        CacheKey {
            focal_facility_id: focal.to_string(),
            radius_bits: 10.0_f64.to_bits(),
            facility_type: None,
            snapshot: "2024-05-01".parse().unwrap(),
            measures: vec!["STAR".into()],
            benchmark: None,
        }
    }

    fn matrix(focal: &str) -> ComparisonMatrix {
        ComparisonMatrix {
            focal_facility_id: focal.to_string(),
            snapshot: "2024-05-01".parse().unwrap(),
            radius_miles: 10.0,
            facility_type: None,
            columns: vec![],
            rows: vec![],
            benchmark: None,
        }
    }

    #[test]
    fn noop_never_hits() {
        let cache = NoopCache;
        cache.put(key("F1"), matrix("F1"));
        assert!(cache.get(&key("F1")).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = TtlCache::new(Duration::from_secs(60), 8);
        cache.put(key("F1"), matrix("F1"));
        assert_eq!(cache.get(&key("F1")), Some(matrix("F1")));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.get(&key("F1")).is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get(&key("F1")).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn full_cache_evicts_oldest() {
        let cache = TtlCache::new(Duration::from_secs(600), 2);
        cache.put(key("F1"), matrix("F1"));
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.put(key("F2"), matrix("F2"));
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.put(key("F3"), matrix("F3"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("F1")).is_none());
        assert!(cache.get(&key("F2")).is_some());
        assert!(cache.get(&key("F3")).is_some());
    }

    #[test]
    fn radius_is_part_of_the_key() {
        let cache = TtlCache::new(Duration::from_secs(60), 8);
        cache.put(key("F1"), matrix("F1"));
        let mut wider = key("F1");
        wider.radius_bits = 12.5_f64.to_bits();
        assert!(cache.get(&wider).is_none());
    }

    #[test]
    fn disabled_config_gives_noop() {
        let config = EngineConfig {
            cache_ttl_secs: 0,
            ..EngineConfig::default()
        };
        let cache = cache_from_config(&config);
        cache.put(key("F1"), matrix("F1"));
        assert!(cache.get(&key("F1")).is_none());
    }
}
