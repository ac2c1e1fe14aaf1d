// SPDX-License-Identifier: MPL-2.0
//! Memoizing async cache with in-flight de-duplication.
//!
//! # Design
//!
//! - **LRU eviction**: Least recently used entries are evicted first
//! - **Single flight**: Concurrent lookups of the same key await one resolution
//! - **Failures not cached**: A failed resolution leaves the key empty so the
//!   next lookup retries
//!
//! # Usage
//!
//! ```ignore
//! let cache: AsyncCache<AssetId, String> = AsyncCache::new("thumbnails", 256);
//!
//! let uri = cache
//!     .get_or_try_resolve(id.clone(), || async { generate(&id).await })
//!     .await?;
//! ```

use lru::LruCache;
use std::future::Future;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OnceCell;

/// Locks a mutex, recovering the data of a poisoned lock.
///
/// Guarded state in this crate is plain data with no invariant spanning a
/// panic, so continuing with it is sound.
pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Statistics about cache performance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of keys currently held.
    pub entries: usize,

    /// Lookups served by an existing entry, resolved or in flight.
    pub hits: u64,

    /// Lookups that started a new resolution.
    pub misses: u64,

    /// Entries evicted due to capacity.
    pub evictions: u64,

    /// Entries inserted.
    pub insertions: u64,
}

impl CacheStats {
    /// Returns the cache hit rate as a percentage (0.0 - 100.0).
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

struct Inner<K: Hash + Eq, V> {
    entries: LruCache<K, Arc<OnceCell<V>>>,
    stats: CacheStats,
}

/// LRU cache whose values are produced by async resolvers.
pub struct AsyncCache<K: Hash + Eq, V> {
    name: &'static str,
    inner: Mutex<Inner<K, V>>,
}

impl<K, V> AsyncCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Creates a cache holding at most `capacity` entries (at least one).
    #[must_use]
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            name,
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                stats: CacheStats::default(),
            }),
        }
    }

    /// Returns the cached value for `key`, resolving it with `resolve` if absent.
    ///
    /// Concurrent calls for the same key share one resolution. The lock is
    /// only held to look up the slot, never while `resolve` runs.
    ///
    /// # Errors
    ///
    /// Returns the resolver's error. Nothing is cached in that case.
    pub async fn get_or_try_resolve<F, Fut, E>(&self, key: K, resolve: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = self.slot(&key);

        match cell.get_or_try_init(resolve).await {
            Ok(value) => Ok(value.clone()),
            Err(err) => {
                let mut inner = lock_unpoisoned(&self.inner);
                let stale = inner
                    .entries
                    .peek(&key)
                    .is_some_and(|current| Arc::ptr_eq(current, &cell) && !current.initialized());
                if stale {
                    inner.entries.pop(&key);
                    inner.stats.entries = inner.entries.len();
                }
                Err(err)
            }
        }
    }

    /// Returns the resolved value for `key` without resolving or promoting it.
    #[must_use]
    pub fn peek(&self, key: &K) -> Option<V> {
        let inner = lock_unpoisoned(&self.inner);
        inner.entries.peek(key).and_then(|cell| cell.get().cloned())
    }

    /// Drops every entry. In-flight resolutions complete but are not kept.
    pub fn clear(&self) {
        let mut inner = lock_unpoisoned(&self.inner);
        let dropped = inner.entries.len();
        inner.entries.clear();
        inner.stats.entries = 0;
        tracing::debug!(cache = self.name, dropped, "cache cleared");
    }

    /// Returns the current cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        lock_unpoisoned(&self.inner).stats
    }

    #[must_use]
    pub fn len(&self) -> usize {
        lock_unpoisoned(&self.inner).entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, key: &K) -> Arc<OnceCell<V>> {
        let mut inner = lock_unpoisoned(&self.inner);
        if let Some(cell) = inner.entries.get(key) {
            let cell = Arc::clone(cell);
            inner.stats.hits += 1;
            return cell;
        }

        let cell = Arc::new(OnceCell::new());
        inner.stats.misses += 1;
        inner.stats.insertions += 1;
        if inner.entries.push(key.clone(), Arc::clone(&cell)).is_some() {
            inner.stats.evictions += 1;
        }
        inner.stats.entries = inner.entries.len();
        cell
    }
}

impl<K: Hash + Eq, V> std::fmt::Debug for AsyncCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = lock_unpoisoned(&self.inner);
        f.debug_struct("AsyncCache")
            .field("name", &self.name)
            .field("capacity", &inner.entries.cap())
            .field("stats", &inner.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn resolves_once_and_serves_hits() {
        let cache: AsyncCache<u32, String> = AsyncCache::new("test", 4);
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        for _ in 0..3 {
            let value = cache
                .get_or_try_resolve(1, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, Infallible>("one".to_string())
                })
                .await
                .unwrap();
            assert_eq!(value, "one");
        }

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
        assert!((stats.hit_rate() - 66.666).abs() < 0.01);
    }

    #[tokio::test]
    async fn concurrent_lookups_share_one_resolution() {
        let cache: Arc<AsyncCache<u32, u32>> = Arc::new(AsyncCache::new("test", 4));
        let calls = Arc::new(AtomicUsize::new(0));

        let lookups = (0..8).map(|_| {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            async move {
                cache
                    .get_or_try_resolve(7, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        Ok::<_, Infallible>(49)
                    })
                    .await
            }
        });
        let results = futures_util::future::join_all(lookups).await;

        assert!(results.iter().all(|r| *r.as_ref().unwrap() == 49));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache: AsyncCache<&str, u32> = AsyncCache::new("test", 4);

        let err = cache
            .get_or_try_resolve("k", || async { Err::<u32, _>("boom") })
            .await;
        assert_eq!(err, Err("boom"));
        assert!(cache.is_empty());
        assert_eq!(cache.peek(&"k"), None);

        let ok = cache
            .get_or_try_resolve("k", || async { Ok::<_, &str>(5) })
            .await;
        assert_eq!(ok, Ok(5));
        assert_eq!(cache.peek(&"k"), Some(5));
    }

    #[tokio::test]
    async fn evicts_least_recently_used() {
        let cache: AsyncCache<u32, u32> = AsyncCache::new("test", 2);
        for key in [1, 2, 3] {
            cache
                .get_or_try_resolve(key, || async move { Ok::<_, Infallible>(key * 10) })
                .await
                .unwrap();
        }

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.peek(&1), None);
        assert_eq!(cache.peek(&3), Some(30));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[tokio::test]
    async fn clear_drops_entries_but_keeps_counters() {
        let cache: AsyncCache<u32, u32> = AsyncCache::new("test", 2);
        cache
            .get_or_try_resolve(1, || async { Ok::<_, Infallible>(1) })
            .await
            .unwrap();
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.stats().entries, 0);
        assert_eq!(cache.stats().insertions, 1);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let cache: AsyncCache<u32, u32> = AsyncCache::new("test", 0);
        assert!(format!("{cache:?}").contains("capacity: 1"));
    }
}
