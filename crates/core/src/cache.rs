//! Content-keyed compile cache.

use crate::types::CompileResult;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default number of documents kept in the cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Memoizes compile results by the exact raw source text.
///
/// Two files with byte-identical content share one entry; any change to the
/// text is a miss. Concurrent writers for the same key store equal values;
/// the last write wins.
pub struct CompileCache {
    entries: Mutex<LruCache<String, CompileResult>>,
}

impl CompileCache {
    /// Creates a cache holding at most `capacity` results (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Looks up `source`, marking the entry as most recently used.
    pub fn get(&self, source: &str) -> Option<CompileResult> {
        self.lock().get(source).cloned()
    }

    /// Stores `result` under `source`, evicting the least recently used
    /// entry when the cache is full.
    pub fn set(&self, source: impl Into<String>, result: CompileResult) {
        self.lock().put(source.into(), result);
    }

    /// Whether `source` is cached, without touching recency.
    pub fn contains(&self, source: &str) -> bool {
        self.lock().contains(source)
    }

    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of cached results.
    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    /// Drops every cached result.
    pub fn clear(&self) {
        self.lock().clear();
    }

    // Entries are replaced wholesale; a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, LruCache<String, CompileResult>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CompileCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl std::fmt::Debug for CompileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.lock();
        f.debug_struct("CompileCache")
            .field("len", &entries.len())
            .field("capacity", &entries.cap())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(code: &str) -> CompileResult {
        CompileResult {
            component_source: code.to_string(),
            ..CompileResult::default()
        }
    }

    #[test]
    fn default_capacity_is_1024() {
        assert_eq!(CompileCache::default().capacity(), 1024);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        assert_eq!(CompileCache::new(0).capacity(), 1);
    }

    #[test]
    fn keys_on_exact_source_text() {
        let cache = CompileCache::new(4);
        cache.set("# A\n", result("a"));
        assert_eq!(cache.get("# A\n").unwrap().component_source, "a");
        assert!(cache.get("# A").is_none());
        assert!(cache.get("# A\n ").is_none());
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = CompileCache::new(2);
        cache.set("one", result("1"));
        cache.set("two", result("2"));
        // Touch "one" so "two" becomes the eviction candidate.
        assert!(cache.get("one").is_some());
        cache.set("three", result("3"));

        assert!(cache.contains("one"));
        assert!(!cache.contains("two"));
        assert!(cache.contains("three"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn overwriting_a_key_keeps_one_entry() {
        let cache = CompileCache::new(2);
        cache.set("same", result("first"));
        cache.set("same", result("second"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("same").unwrap().component_source, "second");
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = CompileCache::new(2);
        cache.set("x", result("x"));
        cache.clear();
        assert!(cache.is_empty());
    }
}
