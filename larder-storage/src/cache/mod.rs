//! Recommendation cache with pantry-driven invalidation and per-user isolation.
//!
//! # Design
//!
//! Everything lives in a flat string key-value store ([`KeyValueStore`]).
//! A cache entry is a recommendation payload plus the time it was fetched;
//! an invalidation mark is the time the user's pantry last changed. Marks
//! are only ever written forward, and staleness is detected at read time:
//! an entry is usable only while no mark at or after its `cached_at` exists.
//!
//! # User Isolation
//!
//! Keys are built exclusively through [`UserScopedKey`], which cannot be
//! constructed without a [`larder_core::UserKey`]. Guests and named users
//! encode to disjoint scopes.
//!
//! # Example
//!
//! ```ignore
//! let cache = RecommendationCache::new(store, backend);
//!
//! let read = cache.get_recommendations(&user).await;
//! if read.was_cache_hit() {
//!     tracing::debug!("served from cache");
//! }
//!
//! // After the pantry changes:
//! cache.invalidate(&user).await;
//! ```

pub mod entry;
pub mod freshness;
pub mod invalidation;
pub mod lmdb_backend;
pub mod memory;
pub mod recommendations;
pub mod traits;
pub mod user_key;

pub use entry::CacheEntry;
pub use freshness::{ReadOrigin, RecommendationRead};
pub use invalidation::{is_usable, InvalidationMark};
pub use lmdb_backend::{LmdbKeyValueStore, LmdbStoreError};
pub use memory::InMemoryKeyValueStore;
pub use recommendations::RecommendationCache;
pub use traits::{CacheStats, KeyValueStore};
pub use user_key::{CachePurpose, UserScopedKey};
