//! Origin metadata for recommendation reads.
//!
//! Callers always get a list back; [`ReadOrigin`] tells them where it came
//! from, so an empty cached payload can be told apart from a failed refresh.

use larder_core::{RecipeSummary, TimestampMs};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOrigin {
    /// Served from a usable cache entry, shuffled.
    Cache { cached_at: TimestampMs },
    /// Fetched from the backend and written to the cache.
    Backend { fetched_at: TimestampMs },
    /// The backend refresh failed; the list is empty.
    Unavailable { reason: String },
}

/// Result of [`super::RecommendationCache::get_recommendations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationRead {
    recipes: Vec<RecipeSummary>,
    origin: ReadOrigin,
}

impl RecommendationRead {
    pub fn from_cache(recipes: Vec<RecipeSummary>, cached_at: TimestampMs) -> Self {
        Self {
            recipes,
            origin: ReadOrigin::Cache { cached_at },
        }
    }

    pub fn from_backend(recipes: Vec<RecipeSummary>, fetched_at: TimestampMs) -> Self {
        Self {
            recipes,
            origin: ReadOrigin::Backend { fetched_at },
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            recipes: Vec::new(),
            origin: ReadOrigin::Unavailable {
                reason: reason.into(),
            },
        }
    }

    pub fn recipes(&self) -> &[RecipeSummary] {
        &self.recipes
    }

    pub fn into_recipes(self) -> Vec<RecipeSummary> {
        self.recipes
    }

    pub fn origin(&self) -> &ReadOrigin {
        &self.origin
    }

    pub fn was_cache_hit(&self) -> bool {
        matches!(self.origin, ReadOrigin::Cache { .. })
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self.origin, ReadOrigin::Unavailable { .. })
    }
}

impl AsRef<[RecipeSummary]> for RecommendationRead {
    fn as_ref(&self) -> &[RecipeSummary] {
        &self.recipes
    }
}
