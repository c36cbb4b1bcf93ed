//! Cached recommendation payloads.

use larder_core::{RecipeSummary, StoreError, TimestampMs, UserKey};

use super::traits::{KeyValueStore, StoreResult};
use super::user_key::{CachePurpose, UserScopedKey};

/// A recommendation payload plus the time it was fetched.
///
/// Stored as two keys: the JSON payload and a decimal millisecond
/// timestamp. The timestamp is written last. If that write fails, the new
/// payload sits next to the previous timestamp, so an entry that was
/// unusable stays unusable until the next successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub user: UserKey,
    pub payload: Vec<RecipeSummary>,
    pub cached_at: TimestampMs,
}

impl CacheEntry {
    pub fn new(user: UserKey, payload: Vec<RecipeSummary>, cached_at: TimestampMs) -> Self {
        Self {
            user,
            payload,
            cached_at,
        }
    }

    /// Load the entry for `user`. Both keys must be present.
    ///
    /// # Errors
    ///
    /// `StoreError::Corrupt` when either value fails to parse, or the
    /// underlying store error.
    pub async fn load<S>(store: &S, user: &UserKey) -> StoreResult<Option<Self>>
    where
        S: KeyValueStore + ?Sized,
    {
        let payload_key = UserScopedKey::new(user, CachePurpose::RecommendationPayload).encode();
        let time_key = UserScopedKey::new(user, CachePurpose::RecommendationTimestamp).encode();

        let (Some(raw_payload), Some(raw_time)) =
            (store.get(&payload_key).await?, store.get(&time_key).await?)
        else {
            return Ok(None);
        };

        let cached_at = parse_timestamp(&time_key, &raw_time)?;
        let payload: Vec<RecipeSummary> =
            serde_json::from_str(&raw_payload).map_err(|e| StoreError::Corrupt {
                key: payload_key,
                reason: e.to_string(),
            })?;

        Ok(Some(Self::new(user.clone(), payload, cached_at)))
    }

    /// Persist this entry, payload first.
    pub async fn save<S>(&self, store: &S) -> StoreResult<()>
    where
        S: KeyValueStore + ?Sized,
    {
        let payload_key =
            UserScopedKey::new(&self.user, CachePurpose::RecommendationPayload).encode();
        let time_key =
            UserScopedKey::new(&self.user, CachePurpose::RecommendationTimestamp).encode();

        let payload = serde_json::to_string(&self.payload).map_err(|e| StoreError::Corrupt {
            key: payload_key.clone(),
            reason: e.to_string(),
        })?;

        store.set(&payload_key, &payload).await?;
        store.set(&time_key, &self.cached_at.to_string()).await
    }
}

pub(crate) fn parse_timestamp(key: &str, raw: &str) -> StoreResult<TimestampMs> {
    raw.trim()
        .parse::<TimestampMs>()
        .map_err(|e| StoreError::Corrupt {
            key: key.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::InMemoryKeyValueStore;
    use larder_test_utils::recipes;

    #[tokio::test]
    async fn test_save_then_load() {
        let store = InMemoryKeyValueStore::new();
        let user = UserKey::user("alice");
        let entry = CacheEntry::new(user.clone(), recipes(1, 3), 1_000);

        entry.save(&store).await.unwrap();

        let loaded = CacheEntry::load(&store, &user).await.unwrap();
        assert_eq!(loaded, Some(entry));
        assert_eq!(
            store.get("user.alice/recommendations_cache_time").await.unwrap().as_deref(),
            Some("1000")
        );
    }

    #[tokio::test]
    async fn test_empty_payload_is_still_an_entry() {
        let store = InMemoryKeyValueStore::new();
        CacheEntry::new(UserKey::Guest, vec![], 5).save(&store).await.unwrap();

        let loaded = CacheEntry::load(&store, &UserKey::Guest).await.unwrap().unwrap();
        assert!(loaded.payload.is_empty());
    }

    #[tokio::test]
    async fn test_missing_timestamp_means_no_entry() {
        let store = InMemoryKeyValueStore::new();
        store.set("guest/recommendations_cache", "[]").await.unwrap();

        assert_eq!(CacheEntry::load(&store, &UserKey::Guest).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_reported() {
        let store = InMemoryKeyValueStore::new();
        store.set("guest/recommendations_cache", "{not json").await.unwrap();
        store.set("guest/recommendations_cache_time", "12").await.unwrap();

        let err = CacheEntry::load(&store, &UserKey::Guest).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { key, .. } if key == "guest/recommendations_cache"));
    }

    #[tokio::test]
    async fn test_corrupt_timestamp_is_reported() {
        let store = InMemoryKeyValueStore::new();
        store.set("guest/recommendations_cache", "[]").await.unwrap();
        store.set("guest/recommendations_cache_time", "yesterday").await.unwrap();

        let err = CacheEntry::load(&store, &UserKey::Guest).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    /// Store whose timestamp writes always fail.
    struct TimestampWritesFail(InMemoryKeyValueStore);

    #[async_trait::async_trait]
    impl KeyValueStore for TimestampWritesFail {
        async fn get(&self, key: &str) -> StoreResult<Option<String>> {
            self.0.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
            if key.ends_with(CachePurpose::RecommendationTimestamp.as_str()) {
                return Err(StoreError::Io {
                    reason: "disk full".to_string(),
                });
            }
            self.0.set(key, value).await
        }

        async fn remove(&self, key: &str) -> StoreResult<()> {
            self.0.remove(key).await
        }
    }

    #[tokio::test]
    async fn test_failed_timestamp_write_keeps_stale_entry_unusable() {
        use crate::cache::invalidation::{is_usable, InvalidationMark};

        let user = UserKey::user("alice");
        let inner = InMemoryKeyValueStore::new();
        CacheEntry::new(user.clone(), recipes(1, 2), 5).save(&inner).await.unwrap();
        let mark = InvalidationMark::record(&inner, &user, 10).await.unwrap();
        let store = TimestampWritesFail(inner);

        let fresh = CacheEntry::new(user.clone(), recipes(50, 1), 20);
        assert!(fresh.save(&store).await.is_err());

        let loaded = CacheEntry::load(&store, &user).await.unwrap().unwrap();
        assert_eq!(loaded.cached_at, 5);
        assert!(!is_usable(Some(&loaded), Some(&mark)));
    }
}
