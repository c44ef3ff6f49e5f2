use std::{
    collections::HashMap,
    hash::Hash,
    time::{Duration, Instant},
};

use parking_lot::Mutex;

/// Map whose entries expire `ttl` after having been inserted.
///
/// Expired entries are never returned; they are removed lazily on lookup or
/// all at once by `purge_expired`.
///
/// Every `invalidate` and `clear` bumps a generation counter. A value computed
/// from data read before the bump can be offered with `insert_if_current`,
/// which refuses it.
pub struct TtlCache<K, V> {
    ttl: Duration,
    inner: Mutex<Inner<K, V>>,
}

struct Inner<K, V> {
    generation: u64,
    entries: HashMap<K, (Instant, V)>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> TtlCache<K, V> {
        TtlCache {
            ttl,
            inner: Mutex::new(Inner {
                generation: 0,
                entries: HashMap::new(),
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// To be read before computing a value passed to `insert_if_current`
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    pub fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Instant::now())
    }

    /// Inserts unless something was invalidated since `generation` was read.
    /// Returns whether the value was stored.
    pub fn insert_if_current(&self, key: K, value: V, generation: u64) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            return false;
        }
        inner.entries.insert(key, (Instant::now(), value));
        true
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Returns whether an entry was actually removed
    pub fn invalidate(&self, key: &K) -> bool {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.entries.clear()
    }

    /// Returns the number of entries removed
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    /// Counts expired-but-not-yet-purged entries too
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert_at(&self, key: K, value: V, now: Instant) {
        self.inner.lock().entries.insert(key, (now, value));
    }

    fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let mut inner = self.inner.lock();
        let entries = &mut inner.entries;
        match entries.get(key) {
            None => return None,
            Some((inserted, v)) if now.saturating_duration_since(*inserted) < self.ttl => {
                return Some(v.clone())
            }
            Some(_) => (),
        }
        entries.remove(key);
        None
    }

    fn purge_expired_at(&self, now: Instant) -> usize {
        let mut inner = self.inner.lock();
        let entries = &mut inner.entries;
        let before = entries.len();
        entries.retain(|_, (inserted, _)| now.saturating_duration_since(*inserted) < self.ttl);
        before - entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn fresh_entries_are_returned() {
        let cache = TtlCache::new(TTL);
        cache.insert("a", 1);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"b"), None);
        assert_eq!(cache.ttl(), TTL);
    }

    #[test]
    fn entries_expire() {
        let cache = TtlCache::new(TTL);
        let t0 = Instant::now();
        cache.insert_at("a", 1, t0);
        assert_eq!(cache.get_at(&"a", t0 + TTL - Duration::from_secs(1)), Some(1));
        assert_eq!(cache.get_at(&"a", t0 + TTL), None);
        // expired lookups evict
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_ttl_never_hits() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.insert("a", 1);
        assert_eq!(cache.get(&"a"), None);
    }

    #[test]
    fn invalidate_and_clear() {
        let cache = TtlCache::new(TTL);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert!(cache.invalidate(&"a"));
        assert!(!cache.invalidate(&"a"));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn stale_values_are_refused_after_invalidation() {
        let cache = TtlCache::new(TTL);
        let gen = cache.generation();
        assert!(cache.insert_if_current("a", 1, gen));
        assert_eq!(cache.get(&"a"), Some(1));

        let before_submit = cache.generation();
        cache.invalidate(&"a");
        assert!(!cache.insert_if_current("a", 1, before_submit));
        assert_eq!(cache.get(&"a"), None);

        let gen = cache.generation();
        cache.clear();
        assert!(!cache.insert_if_current("a", 2, gen));
        assert!(cache.insert_if_current("a", 3, cache.generation()));
        assert_eq!(cache.get(&"a"), Some(3));
    }

    #[test]
    fn purge_removes_only_expired() {
        let cache = TtlCache::new(TTL);
        let t0 = Instant::now();
        cache.insert_at("old", 1, t0);
        cache.insert_at("new", 2, t0 + Duration::from_secs(30));
        assert_eq!(cache.purge_expired_at(t0 + Duration::from_secs(61)), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_at(&"new", t0 + Duration::from_secs(61)), Some(2));
    }
}
