use lru::LruCache;
use parking_lot::Mutex;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Upper bound on lock shards per cache
pub const DEFAULT_SHARDS: usize = 8;

/// A cached value and the moment it was stored
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub inserted_at: Instant,
    /// Cache-wide recency stamp, bumped on every read or write
    last_used: u64,
}

impl<V> CacheEntry<V> {
    fn new(value: V, last_used: u64) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            last_used,
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() > ttl
    }
}

/// Bounded cache with per-entry time-to-live.
///
/// Keys are hashed into shards, each an LRU list behind its own lock, so
/// operations on different buckets never contend. The capacity bounds the
/// whole cache: once the total exceeds it, the least recently used entry
/// across all shards is evicted. Expired entries are dropped lazily when they
/// are looked up. Reads refresh recency but never `inserted_at`.
pub struct TtlCache<K, V> {
    shards: Box<[Mutex<LruCache<K, CacheEntry<V>>>]>,
    capacity: usize,
    ttl: Duration,
    hasher: RandomState,
    len: AtomicUsize,
    clock: AtomicU64,
}

impl<K: Hash + Eq, V: Clone> TtlCache<K, V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self::with_shards(capacity, ttl, DEFAULT_SHARDS)
    }

    /// Create a cache with an explicit shard count (clamped to `1..=capacity`)
    pub fn with_shards(capacity: usize, ttl: Duration, shards: usize) -> Self {
        let capacity = capacity.max(1);
        let shards = (0..shards.clamp(1, capacity))
            .map(|_| Mutex::new(LruCache::unbounded()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            shards,
            capacity,
            ttl,
            hasher: RandomState::new(),
            len: AtomicUsize::new(0),
            clock: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Index of the bucket `key` belongs to
    pub fn shard_index(&self, key: &K) -> usize {
        let hash = self.hasher.hash_one(key);
        (hash % self.shards.len() as u64) as usize
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Fresh value for `key`, marking it most recently used
    pub fn get(&self, key: &K) -> Option<V> {
        let mut shard = self.shards[self.shard_index(key)].lock();
        let expired = match shard.get_mut(key) {
            Some(entry) if !entry.is_expired(self.ttl) => {
                entry.last_used = self.tick();
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired && shard.pop(key).is_some() {
            self.len.fetch_sub(1, Ordering::AcqRel);
        }
        None
    }

    /// Check for a fresh entry without touching recency
    pub fn contains(&self, key: &K) -> bool {
        let shard = self.shards[self.shard_index(key)].lock();
        shard
            .peek(key)
            .is_some_and(|entry| !entry.is_expired(self.ttl))
    }

    /// Store `value`, replacing any previous entry and restarting its TTL
    pub fn insert(&self, key: K, value: V) {
        let idx = self.shard_index(&key);
        {
            let mut shard = self.shards[idx].lock();
            let entry = CacheEntry::new(value, self.tick());
            if shard.put(key, entry).is_none() {
                self.len.fetch_add(1, Ordering::AcqRel);
            }
        }
        self.evict_overflow();
    }

    /// Cached value for `key`, computing and storing it with `factory` on a miss.
    ///
    /// The shard stays locked while `factory` runs, so the factory must not
    /// touch this cache.
    pub fn get_or_insert_with(&self, key: K, factory: impl FnOnce() -> V) -> V {
        let idx = self.shard_index(&key);
        let value = {
            let mut shard = self.shards[idx].lock();
            if let Some(entry) = shard.get_mut(&key) {
                if !entry.is_expired(self.ttl) {
                    entry.last_used = self.tick();
                    return entry.value.clone();
                }
            }
            let value = factory();
            let entry = CacheEntry::new(value.clone(), self.tick());
            if shard.put(key, entry).is_none() {
                self.len.fetch_add(1, Ordering::AcqRel);
            }
            value
        };
        self.evict_overflow();
        value
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let idx = self.shard_index(key);
        let removed = self.shards[idx].lock().pop(key)?;
        self.len.fetch_sub(1, Ordering::AcqRel);
        Some(removed.value)
    }

    /// Number of stored entries, including expired ones not yet dropped
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        for shard in self.shards.iter() {
            let mut shard = shard.lock();
            self.len.fetch_sub(shard.len(), Ordering::AcqRel);
            shard.clear();
        }
    }

    /// Evict least recently used entries until the total fits the capacity.
    ///
    /// Takes one shard lock at a time; each eviction is reserved on the
    /// counter first so concurrent inserts never evict more than the overflow.
    fn evict_overflow(&self) {
        let capacity = self.capacity;
        while self
            .len
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |len| {
                (len > capacity).then(|| len - 1)
            })
            .is_ok()
        {
            if !self.pop_oldest() {
                self.len.fetch_add(1, Ordering::AcqRel);
                break;
            }
        }
    }

    /// Drop the entry with the oldest recency stamp among the shard tails
    fn pop_oldest(&self) -> bool {
        for _ in 0..self.shards.len() {
            let oldest = self
                .shards
                .iter()
                .enumerate()
                .filter_map(|(idx, shard)| {
                    shard
                        .lock()
                        .peek_lru()
                        .map(|(_, entry)| (entry.last_used, idx))
                })
                .min();
            let Some((_, idx)) = oldest else {
                return false;
            };
            if self.shards[idx].lock().pop_lru().is_some() {
                return true;
            }
        }
        false
    }
}
