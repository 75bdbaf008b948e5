use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use lru::LruCache;

use crate::model::Card;

const DEFAULT_CAPACITY: usize = 1000;

/// Cumulative counters exposed alongside the cache's current occupancy.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

fn normalize(key: &str) -> String {
    key.to_lowercase().trim().to_string()
}

/// Bounded LRU in front of the Card Store, keyed by normalized card name
/// (and populated under the card's id as an alias whenever an id lookup
/// resolves). Backed by the `lru` crate's `LruCache`, which already gives
/// O(1) get/put with move-to-front-on-access semantics; this wrapper adds
/// key normalization and the hit/miss/eviction counters the Repository
/// reports through `get_cache_stats`.
pub struct CardCache {
    inner: Mutex<LruCache<String, Card>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl CardCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &str) -> Option<Card> {
        let key = normalize(key);
        let mut inner = self.inner.lock().unwrap();
        match inner.get(&key) {
            Some(card) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(card.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Inserts under `key`, and also under the card's id if it differs, so
    /// a later id lookup benefits from a name-keyed insert and vice versa.
    pub fn put(&self, key: &str, card: Card) {
        let key = normalize(key);
        let mut inner = self.inner.lock().unwrap();
        if let Some((evicted_key, _)) = inner.push(key.clone(), card.clone()) {
            if evicted_key != key {
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }

        let id_key = normalize(&card.id);
        if id_key != key {
            inner.put(id_key, card);
        }
    }

    pub fn evict(&self, key: &str) {
        let key = normalize(key);
        let mut inner = self.inner.lock().unwrap();
        if inner.pop(&key).is_some() {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            size: self.inner.lock().unwrap().len(),
        }
    }
}

impl Default for CardCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Color;

    fn card(id: &str, name: &str) -> Card {
        let mut c = Card::basic_land(Color::Blue);
        c.id = id.to_string();
        c.name = name.to_string();
        c
    }

    #[test]
    fn get_after_put_is_a_hit_and_normalizes_the_key() {
        let cache = CardCache::new(10);
        cache.put("Island", card("island", "Island"));
        assert!(cache.get("  island  ").is_some());
        let stats = cache.get_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn miss_increments_miss_counter() {
        let cache = CardCache::new(10);
        assert!(cache.get("nothing").is_none());
        assert_eq!(cache.get_stats().misses, 1);
    }

    #[test]
    fn overflow_evicts_the_least_recently_used_entry() {
        let cache = CardCache::new(2);
        cache.put("a", card("a", "A"));
        cache.put("b", card("b", "B"));
        cache.get("a"); // touch a so it's MRU
        cache.put("c", card("c", "C")); // evicts b, the LRU entry
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get_stats().evictions >= 1);
    }

    #[test]
    fn id_alias_resolves_after_a_name_keyed_put() {
        let cache = CardCache::new(10);
        cache.put("Lightning Bolt", card("lightning-bolt", "Lightning Bolt"));
        assert!(cache.get("lightning-bolt").is_some());
    }
}
