use moka::future::Cache;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

/// Per-key result cache with a fixed time-to-live.
///
/// Entries expire lazily: once `ttl` has elapsed since an entry was written,
/// lookups treat it as absent. Writing a key again replaces the value and
/// restarts its clock. Cloning is cheap and clones share the same storage.
#[derive(Clone)]
pub struct TtlCache<K, V> {
    cache: Cache<K, V>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    /// Get a value if it exists and is still within its TTL
    pub async fn get(&self, key: &K) -> Option<V> {
        self.cache.get(key).await
    }

    /// Store a value, overwriting any previous entry for the key
    pub async fn put(&self, key: K, value: V) {
        self.cache.insert(key, value).await;
    }

    /// Return the cached value, or run `init` to produce and store it.
    ///
    /// Concurrent callers missing on the same key share a single `init`
    /// future. If it fails, every waiter gets the error and nothing is
    /// stored. If the caller driving it is dropped, nothing is stored and a
    /// remaining waiter takes over.
    pub async fn get_or_try_insert_with<F, E>(&self, key: K, init: F) -> Result<V, E>
    where
        F: Future<Output = Result<V, E>>,
        E: Clone + Send + Sync + 'static,
    {
        self.cache
            .try_get_with(key, init)
            .await
            .map_err(|e: Arc<E>| E::clone(&e))
    }

    /// Approximate number of live entries, for monitoring
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}
