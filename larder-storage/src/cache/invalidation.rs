//! Pantry invalidation marks.
//!
//! A mark records the most recent pantry mutation for one user. It is
//! never deleted and only ever moves forward in time; the cache compares
//! it with an entry's `cached_at` at read time.

use larder_core::{TimestampMs, UserKey};

use super::entry::{parse_timestamp, CacheEntry};
use super::traits::{KeyValueStore, StoreResult};
use super::user_key::{CachePurpose, UserScopedKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationMark {
    pub user: UserKey,
    pub invalidated_at: TimestampMs,
}

impl InvalidationMark {
    pub fn new(user: UserKey, invalidated_at: TimestampMs) -> Self {
        Self {
            user,
            invalidated_at,
        }
    }

    /// Whether `entry` was fetched strictly after this mark.
    pub fn permits(&self, entry: &CacheEntry) -> bool {
        self.invalidated_at < entry.cached_at
    }

    pub async fn load<S>(store: &S, user: &UserKey) -> StoreResult<Option<Self>>
    where
        S: KeyValueStore + ?Sized,
    {
        let key = UserScopedKey::new(user, CachePurpose::PantryInvalidation).encode();
        match store.get(&key).await? {
            Some(raw) => Ok(Some(Self::new(user.clone(), parse_timestamp(&key, &raw)?))),
            None => Ok(None),
        }
    }

    /// Record a pantry mutation at `now` for `user`.
    ///
    /// An existing mark later than `now` (clock skew between writers) is
    /// kept, so the mark never moves backwards. Returns the mark in force.
    pub async fn record<S>(store: &S, user: &UserKey, now: TimestampMs) -> StoreResult<Self>
    where
        S: KeyValueStore + ?Sized,
    {
        let key = UserScopedKey::new(user, CachePurpose::PantryInvalidation).encode();
        let existing = match store.get(&key).await? {
            Some(raw) => parse_timestamp(&key, &raw).ok(),
            None => None,
        };
        let mark = Self::new(user.clone(), existing.map_or(now, |at| at.max(now)));
        store.set(&key, &mark.invalidated_at.to_string()).await?;
        Ok(mark)
    }
}

/// The usability rule: an entry exists and no mark is at or after it.
pub fn is_usable(entry: Option<&CacheEntry>, mark: Option<&InvalidationMark>) -> bool {
    match (entry, mark) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(entry), Some(mark)) => mark.permits(entry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::InMemoryKeyValueStore;

    fn entry_at(cached_at: TimestampMs) -> CacheEntry {
        CacheEntry::new(UserKey::Guest, vec![], cached_at)
    }

    fn mark(at: TimestampMs) -> InvalidationMark {
        InvalidationMark::new(UserKey::Guest, at)
    }

    #[test]
    fn test_usability_rule() {
        let entry = entry_at(100);
        assert!(!is_usable(None, None));
        assert!(!is_usable(None, Some(&mark(1))));
        assert!(is_usable(Some(&entry), None));
        assert!(is_usable(Some(&entry), Some(&mark(99))));
        assert!(!is_usable(Some(&entry), Some(&mark(100))));
        assert!(!is_usable(Some(&entry), Some(&mark(101))));
    }

    #[tokio::test]
    async fn test_record_only_moves_forward() {
        let store = InMemoryKeyValueStore::new();
        let user = UserKey::user("carol");

        let first = InvalidationMark::record(&store, &user, 500).await.unwrap();
        assert_eq!(first.invalidated_at, 500);

        let skewed = InvalidationMark::record(&store, &user, 400).await.unwrap();
        assert_eq!(skewed.invalidated_at, 500);

        let later = InvalidationMark::record(&store, &user, 900).await.unwrap();
        assert_eq!(later.invalidated_at, 900);
        assert_eq!(
            InvalidationMark::load(&store, &user).await.unwrap(),
            Some(InvalidationMark::new(user.clone(), 900))
        );
    }

    #[tokio::test]
    async fn test_record_overwrites_corrupt_mark() {
        let store = InMemoryKeyValueStore::new();
        store.set("guest/pantry_last_updated", "NaN").await.unwrap();
        assert!(InvalidationMark::load(&store, &UserKey::Guest).await.is_err());

        InvalidationMark::record(&store, &UserKey::Guest, 7).await.unwrap();
        assert_eq!(
            InvalidationMark::load(&store, &UserKey::Guest).await.unwrap(),
            Some(mark(7))
        );
    }
}
