//! Serialized responses keyed by requested path, each valid for a fixed
//! delay after insertion.
//!
//! Eviction is driven by the caller's clock: every access first drops the
//! entries whose deadline has passed. Re-inserting a path replaces the entry
//! and restarts its delay.

use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use tracing::trace;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(1000);

#[derive(Debug)]
struct CacheEntry {
    response: String,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: FxHashMap<String, CacheEntry>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        ResponseCache {
            ttl,
            entries: FxHashMap::default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&mut self, path: &str, now: Instant) -> Option<&str> {
        self.evict_expired(now);
        self.entries.get(path).map(|entry| entry.response.as_str())
    }

    pub fn insert(&mut self, path: impl Into<String>, response: String, now: Instant) {
        self.evict_expired(now);
        self.entries.insert(
            path.into(),
            CacheEntry {
                response,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Drop every entry whose delay has elapsed at `now`.
    pub fn evict_expired(&mut self, now: Instant) {
        self.entries.retain(|path, entry| {
            let live = now < entry.expires_at;
            if !live {
                trace!(%path, "evicting cached response");
            }
            live
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        ResponseCache::new(DEFAULT_CACHE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_within_delay() {
        let start = Instant::now();
        let mut cache = ResponseCache::default();
        cache.insert("a.ts", "{}".into(), start);
        assert_eq!(cache.get("a.ts", start + Duration::from_millis(999)), Some("{}"));
    }

    #[test]
    fn test_evicted_at_deadline() {
        let start = Instant::now();
        let mut cache = ResponseCache::new(Duration::from_millis(1000));
        cache.insert("a.ts", "{}".into(), start);
        assert_eq!(cache.get("a.ts", start + Duration::from_millis(1000)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_reinsert_restarts_delay() {
        let start = Instant::now();
        let mut cache = ResponseCache::new(Duration::from_millis(100));
        cache.insert("a.ts", "old".into(), start);
        cache.insert("a.ts", "new".into(), start + Duration::from_millis(80));
        assert_eq!(cache.get("a.ts", start + Duration::from_millis(150)), Some("new"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_entries_expire_independently() {
        let start = Instant::now();
        let mut cache = ResponseCache::new(Duration::from_millis(100));
        cache.insert("a.ts", "a".into(), start);
        cache.insert("b.ts", "b".into(), start + Duration::from_millis(50));
        let later = start + Duration::from_millis(120);
        assert_eq!(cache.get("a.ts", later), None);
        assert_eq!(cache.get("b.ts", later), Some("b"));
    }
}
