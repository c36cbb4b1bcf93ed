//! Home feed: recommendations, featured recipes and category shelves.

use std::sync::Arc;

use larder_core::{RecipeBackend, RecipeSummary, UserKey};
use larder_storage::{KeyValueStore, RecommendationCache, RecommendationRead};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// Category pool used when none is configured.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Breakfast",
    "Chicken",
    "Beef",
    "Pork",
    "Seafood",
    "Vegetarian",
    "Vegan",
    "Pasta",
    "Soup",
    "Salad",
    "Dessert",
    "Side Dish",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HomeConfig {
    #[serde(default = "default_category_count")]
    pub category_count: usize,
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

fn default_category_count() -> usize {
    5
}

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            category_count: default_category_count(),
            categories: default_categories(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryShelf {
    pub name: String,
    pub recipes: Vec<RecipeSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeData {
    pub recommendations: RecommendationRead,
    pub featured: Vec<RecipeSummary>,
    pub shelves: Vec<CategoryShelf>,
}

pub struct HomeFeed<S: ?Sized, B: ?Sized> {
    backend: Arc<B>,
    cache: Arc<RecommendationCache<S, B>>,
    config: HomeConfig,
}

impl<S, B> HomeFeed<S, B>
where
    S: KeyValueStore + ?Sized,
    B: RecipeBackend + ?Sized,
{
    pub fn new(backend: Arc<B>, cache: Arc<RecommendationCache<S, B>>, config: HomeConfig) -> Self {
        Self {
            backend,
            cache,
            config,
        }
    }

    /// Load everything the home view shows for `user`. Never fails; parts
    /// that could not be fetched are empty or missing.
    pub async fn load(&self, user: &UserKey) -> HomeData {
        let recommendations = self.cache.get_recommendations(user).await;

        let featured = match self.backend.random_recipes().await {
            Ok(recipes) => recipes,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load featured recipes");
                Vec::new()
            }
        };

        let mut shelves = Vec::new();
        for name in self.pick_categories() {
            match self.backend.category(&name).await {
                Ok(recipes) => shelves.push(CategoryShelf { name, recipes }),
                Err(err) => {
                    tracing::warn!(category = %name, error = %err, "Failed to load category shelf");
                }
            }
        }

        tracing::debug!(
            user = %user,
            recommendations = recommendations.recipes().len(),
            shelves = shelves.len(),
            "Home feed loaded"
        );
        HomeData {
            recommendations,
            featured,
            shelves,
        }
    }

    /// Up to `category_count` distinct categories, drawn at random.
    pub fn pick_categories(&self) -> Vec<String> {
        let mut pool: Vec<&String> = Vec::with_capacity(self.config.categories.len());
        for category in &self.config.categories {
            if !category.trim().is_empty() && !pool.contains(&category) {
                pool.push(category);
            }
        }
        if pool.len() < self.config.category_count {
            tracing::debug!(
                requested = self.config.category_count,
                available = pool.len(),
                "Category pool smaller than requested shelf count"
            );
        }
        pool.choose_multiple(&mut rand::rng(), self.config.category_count)
            .map(|category| category.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::BackendError;
    use larder_storage::{InMemoryKeyValueStore, ReadOrigin};
    use larder_test_utils::{ids, recipes, BackendCall, MockBackend};
    use std::collections::HashSet;

    type Feed = HomeFeed<InMemoryKeyValueStore, MockBackend>;

    fn feed(backend: MockBackend, config: HomeConfig) -> (Feed, Arc<MockBackend>) {
        let backend = Arc::new(backend);
        let cache = Arc::new(RecommendationCache::new(
            Arc::new(InMemoryKeyValueStore::new()),
            backend.clone(),
        ));
        (HomeFeed::new(backend.clone(), cache, config), backend)
    }

    fn config(count: usize, categories: &[&str]) -> HomeConfig {
        HomeConfig {
            category_count: count,
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_picks_are_unique() {
        let (feed, _) = feed(MockBackend::new(), config(3, &["A", "B", "A", "C", "D"]));
        for _ in 0..50 {
            let picks = feed.pick_categories();
            assert_eq!(picks.len(), 3);
            let unique: HashSet<_> = picks.iter().collect();
            assert_eq!(unique.len(), 3);
        }
    }

    #[test]
    fn test_small_pool_yields_fewer_shelves() {
        let (feed, _) = feed(MockBackend::new(), config(5, &["A", "B", " "]));
        let mut picks = feed.pick_categories();
        picks.sort();
        assert_eq!(picks, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_default_pool_has_enough_categories() {
        let config = HomeConfig::default();
        assert!(config.categories.len() >= config.category_count);
    }

    #[tokio::test]
    async fn test_load_combines_sources_and_skips_failed_shelves() {
        let backend = MockBackend::new()
            .with_recommendations(recipes(1, 2))
            .with_random(recipes(10, 3))
            .with_category("Soup", recipes(20, 1))
            .with_category("Pasta", recipes(30, 2));
        let (feed, backend) = feed(backend, config(3, &["Soup", "Pasta", "Unknown"]));

        let home = feed.load(&UserKey::Guest).await;

        assert!(matches!(home.recommendations.origin(), ReadOrigin::Backend { .. }));
        assert_eq!(ids(&home.featured), vec![10, 11, 12]);
        let mut names: Vec<_> = home.shelves.iter().map(|s| s.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["Pasta", "Soup"]);
        assert_eq!(
            backend.count(|call| matches!(call, BackendCall::Category(_))),
            3
        );
    }

    #[tokio::test]
    async fn test_failed_recommendations_do_not_block_the_feed() {
        let backend = MockBackend::new().with_category("Soup", recipes(1, 1));
        backend.fail_recommendations(BackendError::Transport {
            reason: "offline".into(),
        });
        let (feed, _) = feed(backend, config(1, &["Soup"]));

        let home = feed.load(&UserKey::user("zoe")).await;

        assert!(home.recommendations.is_unavailable());
        assert_eq!(home.shelves.len(), 1);
    }
}
