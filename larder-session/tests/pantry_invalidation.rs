//! Pantry changes flowing through to recommendation freshness.

use std::sync::Arc;

use larder_session::{resolve_user, HomeConfig, HomeFeed, PantryService};
use larder_storage::{InMemoryKeyValueStore, KeyValueStore, RecommendationCache};
use larder_test_utils::{recipes, sorted_ids, BackendError, ManualClock, MockBackend, UserKey};

type Cache = RecommendationCache<InMemoryKeyValueStore, MockBackend>;

fn setup(backend: MockBackend) -> (Arc<MockBackend>, Arc<ManualClock>, Arc<Cache>) {
    let backend = Arc::new(backend);
    let clock = Arc::new(ManualClock::default());
    let cache = Arc::new(
        RecommendationCache::new(Arc::new(InMemoryKeyValueStore::new()), backend.clone())
            .with_clock(clock.clone()),
    );
    (backend, clock, cache)
}

#[tokio::test]
async fn test_logged_in_user_sees_fresh_recommendations_after_pantry_edit() {
    let (backend, clock, cache) = setup(
        MockBackend::new()
            .with_user("maria")
            .with_recommendations(recipes(1, 4)),
    );
    let user = resolve_user(backend.as_ref()).await;
    assert_eq!(user, UserKey::user("maria"));

    let feed = HomeFeed::new(backend.clone(), cache.clone(), HomeConfig::default());
    let first = feed.load(&user).await;
    assert!(!first.recommendations.was_cache_hit());

    clock.advance(1_000);
    let second = feed.load(&user).await;
    assert!(second.recommendations.was_cache_hit());
    assert_eq!(backend.recommendation_calls(), 1);

    let pantry = PantryService::new(backend.clone(), cache.clone(), user.clone());
    clock.advance(1_000);
    pantry.add_item("Chickpeas", 2.0, "cans").await.unwrap();
    backend.set_recommendations(recipes(50, 2));

    clock.advance(1_000);
    let third = feed.load(&user).await;
    assert!(!third.recommendations.was_cache_hit());
    assert_eq!(sorted_ids(third.recommendations.recipes()), vec![50, 51]);

    clock.advance(1_000);
    let fourth = feed.load(&user).await;
    assert!(fourth.recommendations.was_cache_hit());
    assert_eq!(backend.recommendation_calls(), 2);
}

#[tokio::test]
async fn test_failed_pantry_write_leaves_no_mark() {
    let (backend, clock, cache) = setup(MockBackend::new().with_recommendations(recipes(1, 2)));
    let user = resolve_user(backend.as_ref()).await;
    assert_eq!(user, UserKey::Guest);

    cache.get_recommendations(&user).await;
    backend.fail_pantry(BackendError::rejected("Not logged in"));
    let pantry = PantryService::new(backend.clone(), cache.clone(), user.clone());

    clock.advance(500);
    assert!(pantry.remove_item("Butter").await.is_err());

    let mark = cache.store().get("guest/pantry_last_updated").await.unwrap();
    assert_eq!(mark, None);
    assert!(cache.get_recommendations(&user).await.was_cache_hit());
}

#[tokio::test]
async fn test_whoami_failure_falls_back_to_guest_cache() {
    let (backend, _clock, cache) = setup(MockBackend::new().with_recommendations(recipes(1, 1)));
    backend.fail_whoami(BackendError::Transport {
        reason: "connection refused".into(),
    });

    let user = resolve_user(backend.as_ref()).await;
    cache.get_recommendations(&user).await;

    let keys = cache.store().keys().await;
    assert!(keys.iter().all(|key| key.starts_with("guest/")));
    assert_eq!(keys.len(), 2);
}
