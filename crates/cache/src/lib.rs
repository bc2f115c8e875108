//! # Context Cache
//!
//! Bounded, time-limited caches shared by the completion context collectors.
//!
//! ## Architecture
//!
//! ```text
//! key
//!  │
//!  ├──> shard = hash(key) % shards
//!  │
//!  ├──> TtlCache          (LRU per shard, lazy expiry on access)
//!  │
//!  └──> AsyncDedupCache   (TtlCache + in-flight map per shard)
//!         ├─> hit      → cached value
//!         ├─> pending  → await the shared computation
//!         └─> miss     → spawn the factory, publish on success
//! ```
//!
//! ## Example
//!
//! ```rust
//! use context_cache::AsyncDedupCache;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let cache: AsyncDedupCache<String, usize> =
//!     AsyncDedupCache::new(100, Duration::from_secs(30));
//!
//! let len = cache
//!     .get("src/lib.rs".to_string(), || async { Ok("fn main() {}".len()) })
//!     .await?;
//! assert_eq!(len, 12);
//! assert_eq!(cache.peek(&"src/lib.rs".to_string()), Some(12));
//! # Ok(())
//! # }
//! ```

mod dedup;
mod error;
mod ttl;

pub use dedup::{AsyncDedupCache, PendingComputation};
pub use error::{CacheError, Result};
pub use ttl::{CacheEntry, TtlCache, DEFAULT_SHARDS};
