use crate::error::{CacheError, Result};
use crate::ttl::TtlCache;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

/// Handle on a computation that is still running for some key.
///
/// Every caller asking for the key while it runs awaits a clone of this handle.
pub type PendingComputation<V> = Shared<BoxFuture<'static, Result<V>>>;

struct Inner<K, V> {
    store: TtlCache<K, V>,
    // Shard `i` tracks in-flight keys of store shard `i`.
    pending: Box<[Mutex<HashMap<K, PendingComputation<V>>>]>,
}

impl<K, V> Inner<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    fn pending_shard(&self, key: &K) -> &Mutex<HashMap<K, PendingComputation<V>>> {
        &self.pending[self.store.shard_index(key)]
    }
}

/// TTL cache that collapses concurrent lookups of the same key into one
/// computation.
///
/// The factory future runs on its own tokio task: it always settles and
/// populates the cache, even when every caller that asked for it has gone
/// away. A failed or panicked computation is reported to all of its waiters,
/// is never cached, and the next request for the key starts a fresh attempt.
///
/// Must be used from within a tokio runtime.
pub struct AsyncDedupCache<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for AsyncDedupCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> AsyncDedupCache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self::from_store(TtlCache::new(capacity, ttl))
    }

    /// Wrap an existing store; the in-flight map uses the same sharding
    pub fn from_store(store: TtlCache<K, V>) -> Self {
        let pending = (0..store.shard_count())
            .map(|_| Mutex::new(HashMap::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            inner: Arc::new(Inner { store, pending }),
        }
    }

    /// Cached value for `key`, joining or starting its computation on a miss
    pub async fn get<F, Fut>(&self, key: K, factory: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        self.get_with(key, factory, || {}).await
    }

    /// Like [`get`](Self::get), calling `on_hit` when a cached value answers
    /// the request without running `factory`.
    ///
    /// `factory` is invoked at most once, synchronously, while the key's
    /// bucket is locked; it must only build the future, not touch this cache.
    pub async fn get_with<F, Fut, H>(&self, key: K, factory: F, on_hit: H) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
        H: FnOnce(),
    {
        let computation = {
            let mut pending = self.inner.pending_shard(&key).lock();
            if let Some(value) = self.inner.store.get(&key) {
                drop(pending);
                on_hit();
                return Ok(value);
            }

            match pending.get(&key) {
                Some(in_flight) => {
                    drop(factory);
                    in_flight.clone()
                }
                None => {
                    let computation = self.spawn(key.clone(), factory());
                    pending.insert(key, computation.clone());
                    computation
                }
            }
        };

        computation.await
    }

    /// Fresh cached value without starting a computation
    pub fn peek(&self, key: &K) -> Option<V> {
        self.inner.store.get(key)
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.inner.pending_shard(key).lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.store.is_empty()
    }

    pub fn clear(&self) {
        self.inner.store.clear();
    }

    fn spawn<Fut>(&self, key: K, future: Fut) -> PendingComputation<V>
    where
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let outcome = AssertUnwindSafe(future).catch_unwind().await;
            let result = match outcome {
                Ok(Ok(value)) => {
                    // Publish before clearing the marker so no caller misses both.
                    inner.store.insert(key.clone(), value.clone());
                    Ok(value)
                }
                Ok(Err(err)) => Err(CacheError::computation(err)),
                Err(_) => {
                    log::warn!("Cached computation panicked; result discarded");
                    Err(CacheError::Panicked)
                }
            };
            inner.pending_shard(&key).lock().remove(&key);
            result
        });

        handle
            .map(|joined| joined.unwrap_or_else(|e| Err(CacheError::Join(e.to_string()))))
            .boxed()
            .shared()
    }
}
