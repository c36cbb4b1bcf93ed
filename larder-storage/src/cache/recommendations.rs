//! Per-user recommendation cache with pantry-driven invalidation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use larder_core::{Clock, RecipeBackend, RecipeSummary, SystemClock, UserKey};
use rand::seq::SliceRandom;

use super::entry::CacheEntry;
use super::freshness::RecommendationRead;
use super::invalidation::{is_usable, InvalidationMark};
use super::traits::{CacheStats, KeyValueStore};

/// Produces recommendations for a user, reusing the last backend response
/// until that user's pantry changes.
///
/// # Type Parameters
///
/// - `S`: The key-value store holding entries and invalidation marks
/// - `B`: The backend the recommendations come from on a miss
///
/// Reads never fail. Store errors while reading count as a miss, store
/// errors while writing are logged, and a failed backend refresh yields an
/// empty [`RecommendationRead`] with an `Unavailable` origin.
pub struct RecommendationCache<S: ?Sized, B: ?Sized> {
    store: Arc<S>,
    backend: Arc<B>,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
    backend_failures: AtomicU64,
}

impl<S, B> RecommendationCache<S, B>
where
    S: KeyValueStore + ?Sized,
    B: RecipeBackend + ?Sized,
{
    pub fn new(store: Arc<S>, backend: Arc<B>) -> Self {
        Self {
            store,
            backend,
            clock: Arc::new(SystemClock),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            backend_failures: AtomicU64::new(0),
        }
    }

    /// Replace the wall clock, mainly for tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Recommendations for `user`.
    ///
    /// A usable entry is returned as a freshly shuffled copy without
    /// contacting the backend. Otherwise the backend is called once; on
    /// success its list is cached and returned in server order.
    pub async fn get_recommendations(&self, user: &UserKey) -> RecommendationRead {
        let entry = match CacheEntry::load(self.store.as_ref(), user).await {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(user = %user, error = %err, "Unreadable recommendation cache entry");
                None
            }
        };

        let usable = match InvalidationMark::load(self.store.as_ref(), user).await {
            Ok(mark) => is_usable(entry.as_ref(), mark.as_ref()),
            Err(err) => {
                // Without a trustworthy mark the entry might predate a pantry change.
                tracing::warn!(user = %user, error = %err, "Unreadable pantry invalidation mark");
                false
            }
        };

        match entry {
            Some(entry) if usable => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    user = %user,
                    count = entry.payload.len(),
                    cached_at = entry.cached_at,
                    "Recommendation cache hit"
                );
                RecommendationRead::from_cache(shuffled(entry.payload), entry.cached_at)
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(user = %user, "Recommendation cache miss");
                self.refresh(user).await
            }
        }
    }

    async fn refresh(&self, user: &UserKey) -> RecommendationRead {
        match self.backend.recommendations().await {
            Ok(recipes) => {
                let fetched_at = self.clock.now_ms();
                let entry = CacheEntry::new(user.clone(), recipes, fetched_at);
                if let Err(err) = entry.save(self.store.as_ref()).await {
                    tracing::warn!(user = %user, error = %err, "Failed to write recommendation cache");
                }
                tracing::debug!(user = %user, count = entry.payload.len(), "Fetched recommendations");
                RecommendationRead::from_backend(entry.payload, fetched_at)
            }
            Err(err) => {
                self.backend_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(user = %user, error = %err, "Recommendation refresh failed");
                RecommendationRead::unavailable(err.to_string())
            }
        }
    }

    /// Record a pantry change for `user`. The cache entry itself is left
    /// in place and judged stale on the next read.
    pub async fn invalidate(&self, user: &UserKey) {
        let now = self.clock.now_ms();
        match InvalidationMark::record(self.store.as_ref(), user, now).await {
            Ok(mark) => {
                tracing::debug!(user = %user, invalidated_at = mark.invalidated_at, "Pantry changed");
            }
            Err(err) => {
                tracing::warn!(user = %user, error = %err, "Failed to record pantry invalidation");
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            backend_failures: self.backend_failures.load(Ordering::Relaxed),
        }
    }
}

fn shuffled(mut recipes: Vec<RecipeSummary>) -> Vec<RecipeSummary> {
    recipes.shuffle(&mut rand::rng());
    recipes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::InMemoryKeyValueStore;
    use crate::cache::ReadOrigin;
    use larder_core::BackendError;
    use larder_test_utils::{recipes, sorted_ids, ManualClock, MockBackend};

    fn cache_with(
        backend: MockBackend,
    ) -> (
        RecommendationCache<InMemoryKeyValueStore, MockBackend>,
        Arc<MockBackend>,
        Arc<ManualClock>,
    ) {
        let backend = Arc::new(backend);
        let clock = Arc::new(ManualClock::default());
        let cache = RecommendationCache::new(Arc::new(InMemoryKeyValueStore::new()), backend.clone())
            .with_clock(clock.clone());
        (cache, backend, clock)
    }

    #[tokio::test]
    async fn test_miss_returns_server_order() {
        let (cache, backend, clock) = cache_with(MockBackend::new().with_recommendations(recipes(1, 4)));

        let read = cache.get_recommendations(&UserKey::Guest).await;

        assert_eq!(read.recipes(), recipes(1, 4).as_slice());
        assert_eq!(
            read.origin(),
            &ReadOrigin::Backend {
                fetched_at: clock.now_ms()
            }
        );
        assert_eq!(backend.recommendation_calls(), 1);
    }

    #[tokio::test]
    async fn test_hit_is_permutation_without_backend_call() {
        let (cache, backend, clock) = cache_with(MockBackend::new().with_recommendations(recipes(1, 8)));
        let user = UserKey::user("alice");

        cache.get_recommendations(&user).await;
        clock.advance(1_000);
        let read = cache.get_recommendations(&user).await;

        assert!(read.was_cache_hit());
        assert_eq!(sorted_ids(read.recipes()), sorted_ids(&recipes(1, 8)));
        assert_eq!(backend.recommendation_calls(), 1);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1, backend_failures: 0 });
    }

    #[tokio::test]
    async fn test_failure_returns_empty_and_skips_write() {
        let (cache, backend, _clock) = cache_with(MockBackend::new());
        backend.fail_recommendations(BackendError::Transport {
            reason: "offline".into(),
        });

        let read = cache.get_recommendations(&UserKey::Guest).await;
        assert!(read.is_unavailable());
        assert!(read.recipes().is_empty());
        assert!(cache.store().is_empty().await);

        backend.set_recommendations(recipes(1, 2));
        let read = cache.get_recommendations(&UserKey::Guest).await;
        assert_eq!(read.recipes().len(), 2);
        assert_eq!(backend.recommendation_calls(), 2);
        assert_eq!(cache.stats().backend_failures, 1);
    }

    #[tokio::test]
    async fn test_empty_payload_is_cached() {
        let (cache, backend, clock) = cache_with(MockBackend::new());

        cache.get_recommendations(&UserKey::Guest).await;
        clock.advance(10);
        let read = cache.get_recommendations(&UserKey::Guest).await;

        assert!(read.was_cache_hit());
        assert!(read.recipes().is_empty());
        assert_eq!(backend.recommendation_calls(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_in_same_millisecond_forces_refetch() {
        let (cache, backend, clock) = cache_with(MockBackend::new().with_recommendations(recipes(1, 3)));

        cache.get_recommendations(&UserKey::Guest).await;
        cache.invalidate(&UserKey::Guest).await;
        clock.advance(1);
        cache.get_recommendations(&UserKey::Guest).await;

        assert_eq!(backend.recommendation_calls(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_mark_forces_refetch() {
        let (cache, backend, clock) = cache_with(MockBackend::new().with_recommendations(recipes(1, 3)));

        cache.get_recommendations(&UserKey::Guest).await;
        cache
            .store()
            .set("guest/pantry_last_updated", "garbage")
            .await
            .unwrap();
        clock.advance(5);
        let read = cache.get_recommendations(&UserKey::Guest).await;

        assert!(!read.was_cache_hit());
        assert_eq!(backend.recommendation_calls(), 2);
    }
}
