//! In-process TTL cache for read-mostly reference data
//!
//! Caches catalog reads (products, categories, ingredient lists) that change
//! rarely but are fetched on every POS screen. Mutating services must call
//! [`ReferenceCache::invalidate`] for the keys they touch; expiry is driven
//! by an injected clock so it can be tested without sleeping.

use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of monotonic time, injectable for tests
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock backed [`Clock`]
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Clone)]
struct CacheEntry {
    value: serde_json::Value,
    inserted_at: Instant,
}

/// TTL cache keyed by reference-data name (e.g. "products", "categories")
#[derive(Clone)]
pub struct ReferenceCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ReferenceCache {
    /// Create a cache with the given TTL and the system clock
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a cache with an explicit clock (used by tests)
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
            clock,
        }
    }

    /// Fetch a cached value if present and not expired
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.entries.get(key)?;
        if self.clock.now().duration_since(entry.inserted_at) >= self.ttl {
            drop(entry);
            self.entries.remove(key);
            return None;
        }
        serde_json::from_value(entry.value.clone()).ok()
    }

    /// Store a value under a key, resetting its TTL
    pub fn put<T: Serialize>(&self, key: &str, value: &T) {
        if let Ok(value) = serde_json::to_value(value) {
            self.entries.insert(
                key.to_string(),
                CacheEntry {
                    value,
                    inserted_at: self.clock.now(),
                },
            );
        }
    }

    /// Drop a key; mutation paths call this after a successful write
    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct ManualClock {
        now: Mutex<Instant>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                now: Mutex::new(Instant::now()),
            }
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }
    }

    #[test]
    fn entry_expires_after_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = ReferenceCache::with_clock(Duration::from_secs(300), clock.clone());

        cache.put("products", &vec!["latte", "americano"]);
        assert_eq!(
            cache.get::<Vec<String>>("products"),
            Some(vec!["latte".to_string(), "americano".to_string()])
        );

        clock.advance(Duration::from_secs(301));
        assert_eq!(cache.get::<Vec<String>>("products"), None);
    }

    #[test]
    fn invalidate_removes_entry_immediately() {
        let cache = ReferenceCache::with_ttl(Duration::from_secs(300));
        cache.put("categories", &vec!["drinks"]);
        cache.invalidate("categories");
        assert_eq!(cache.get::<Vec<String>>("categories"), None);
    }
}
