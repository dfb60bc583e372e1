//! Advisory in-memory event cache.
//!
//! Keyed by `universal_id`, read opportunistically before a store
//! round-trip and written on every create/update/delete. The cache is not
//! authoritative: it can be invalidated wholesale at any time and the
//! store remains the source of truth.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::config::CacheConfig;
use crate::event::StandardizedEvent;

/// Cache hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Hit ratio in 0..=1, zero when nothing was looked up.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// The repository's advisory cache.
#[derive(Clone)]
pub struct EventCache {
    cache: Cache<String, Arc<StandardizedEvent>>,
    enabled: bool,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl EventCache {
    /// Create a cache from configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .build();

        Self {
            cache,
            enabled: config.enabled,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create a disabled cache; every lookup misses.
    pub fn disabled() -> Self {
        Self {
            cache: Cache::builder().max_capacity(0).build(),
            enabled: false,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Look up an event.
    pub async fn get(&self, universal_id: &str) -> Option<Arc<StandardizedEvent>> {
        if !self.enabled {
            return None;
        }
        match self.cache.get(universal_id).await {
            Some(event) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(event)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Write an event through the cache.
    pub async fn insert(&self, event: &StandardizedEvent) {
        if self.enabled {
            self.cache
                .insert(event.universal_id.clone(), Arc::new(event.clone()))
                .await;
        }
    }

    /// Drop a single entry.
    pub async fn invalidate(&self, universal_id: &str) {
        self.cache.invalidate(universal_id).await;
    }

    /// Drop every entry.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Current hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
