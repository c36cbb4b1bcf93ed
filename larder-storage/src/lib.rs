//! Larder Storage
//!
//! Key-value persistence and the per-user recommendation cache built on it.

pub mod cache;

pub use cache::{
    CacheEntry, CachePurpose, CacheStats, InMemoryKeyValueStore, InvalidationMark,
    KeyValueStore, LmdbKeyValueStore, LmdbStoreError, ReadOrigin, RecommendationCache,
    RecommendationRead, UserScopedKey,
};
