//! Word Cache
//!
//! In-process LRU cache over fully hydrated words, keyed by
//! `(user_id, word_id)`. Invalidation is by exact key on every write path —
//! O(1) per write, rather than scanning the keyspace by prefix.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use crate::vocab::VocabularyWord;

/// Default number of words held in the cache.
const DEFAULT_CAPACITY: usize = 1024;

type CacheKey = (String, String);

/// LRU cache of vocabulary words, keyed by `(user_id, word_id)`
///
/// Interior mutability via a `Mutex` so the cache can live behind `&self`
/// on [`crate::Storage`]. A poisoned lock degrades to cache misses; the
/// cache never makes an operation fail.
pub struct WordCache {
    inner: Mutex<LruCache<CacheKey, VocabularyWord>>,
}

impl WordCache {
    /// Create a cache with the default capacity.
    pub fn new() -> Self {
        // SAFETY: DEFAULT_CAPACITY is a non-zero constant
        Self::with_capacity(NonZeroUsize::new(DEFAULT_CAPACITY).expect("capacity is non-zero"))
    }

    /// Create a cache with an explicit capacity.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Look up a word, refreshing its recency on hit.
    pub fn get(&self, user_id: &str, word_id: &str) -> Option<VocabularyWord> {
        let mut cache = self.inner.lock().ok()?;
        cache
            .get(&(user_id.to_string(), word_id.to_string()))
            .cloned()
    }

    /// Insert or replace a word.
    pub fn put(&self, word: &VocabularyWord) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.put((word.user_id.clone(), word.id.clone()), word.clone());
        }
    }

    /// Drop the entry for one word, if cached.
    pub fn invalidate(&self, user_id: &str, word_id: &str) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.pop(&(user_id.to_string(), word_id.to_string()));
        }
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for WordCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(user_id: &str, id: &str) -> VocabularyWord {
        VocabularyWord {
            id: id.to_string(),
            user_id: user_id.to_string(),
            word: "prova".to_string(),
            definition: "test".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_put_get_invalidate() {
        let cache = WordCache::new();
        cache.put(&word("u1", "w1"));

        assert!(cache.get("u1", "w1").is_some());
        assert!(cache.get("u2", "w1").is_none());

        cache.invalidate("u1", "w1");
        assert!(cache.get("u1", "w1").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidation_is_per_key() {
        let cache = WordCache::new();
        cache.put(&word("u1", "w1"));
        cache.put(&word("u1", "w2"));

        cache.invalidate("u1", "w1");
        assert!(cache.get("u1", "w1").is_none());
        assert!(cache.get("u1", "w2").is_some());
    }

    #[test]
    fn test_capacity_evicts_lru() {
        let cache = WordCache::with_capacity(NonZeroUsize::new(2).unwrap());
        cache.put(&word("u1", "w1"));
        cache.put(&word("u1", "w2"));
        cache.put(&word("u1", "w3"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("u1", "w1").is_none());
        assert!(cache.get("u1", "w3").is_some());
    }
}
