use hashlink::LruCache;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A thread-safe LRU cache backed by `hashlink::LruCache`.
///
/// Clones share the same storage, so one handle can live on the event thread
/// while workers insert through another.
pub struct SharedLru<K, V> {
    inner: Arc<Mutex<LruCache<K, V>>>,
}

impl<K, V> Clone for SharedLru<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Eq + Hash, V: Clone> SharedLru<K, V> {
    /// Create a new cache limited to `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LruCache::new(capacity.max(1)))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<K, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Retrieve a value from the cache, updating its recency.
    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.lock().contains_key(key)
    }

    /// Insert a value, evicting the least recently used entry when full.
    pub fn put(&self, key: K, value: V) {
        self.lock().insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    /// Clear all cached entries.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_used() {
        let cache = SharedLru::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.get(&"a"), Some(1));
        cache.put("c", 3);
        assert!(cache.contains(&"a"));
        assert!(!cache.contains(&"b"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn clones_share_storage() {
        let cache = SharedLru::new(4);
        let other = cache.clone();
        let handle = std::thread::spawn(move || other.put(1u32, "one".to_string()));
        handle.join().unwrap();
        assert_eq!(cache.get(&1), Some("one".to_string()));
    }

    #[test]
    fn zero_capacity_still_holds_one() {
        let cache = SharedLru::new(0);
        cache.put(1, 1);
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.get(&1), Some(1));
    }
}
