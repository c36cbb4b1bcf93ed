//! Pantry reads and mutations.

use std::sync::Arc;

use larder_core::{BackendError, BackendResult, PantryItem, RecipeBackend, UserKey};
use larder_storage::{KeyValueStore, RecommendationCache};

/// One user's pantry.
///
/// Every successful mutation records a pantry invalidation for the user,
/// so their next recommendation read goes back to the backend. Failed
/// mutations leave the cache alone.
pub struct PantryService<S: ?Sized, B: ?Sized> {
    backend: Arc<B>,
    cache: Arc<RecommendationCache<S, B>>,
    user: UserKey,
}

impl<S, B> PantryService<S, B>
where
    S: KeyValueStore + ?Sized,
    B: RecipeBackend + ?Sized,
{
    pub fn new(backend: Arc<B>, cache: Arc<RecommendationCache<S, B>>, user: UserKey) -> Self {
        Self {
            backend,
            cache,
            user,
        }
    }

    pub fn user(&self) -> &UserKey {
        &self.user
    }

    pub async fn items(&self) -> BackendResult<Vec<PantryItem>> {
        self.backend.pantry_items().await
    }

    /// Add an ingredient, or update its amount if already present.
    pub async fn add_item(&self, name: &str, amount: f64, units: &str) -> BackendResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BackendError::rejected("ingredient name is required"));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(BackendError::rejected(format!(
                "amount for {} must be greater than zero",
                name
            )));
        }
        self.mutate(PantryItem::new(name, amount, units.trim())).await
    }

    pub async fn remove_item(&self, name: &str) -> BackendResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BackendError::rejected("ingredient name is required"));
        }
        self.mutate(PantryItem::removal(name)).await
    }

    async fn mutate(&self, item: PantryItem) -> BackendResult<()> {
        match self.backend.update_pantry(std::slice::from_ref(&item)).await {
            Ok(()) => {
                tracing::info!(
                    user = %self.user,
                    item = %item.name,
                    removed = item.is_removal(),
                    "Pantry updated"
                );
                self.cache.invalidate(&self.user).await;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(user = %self.user, item = %item.name, error = %err, "Pantry update failed");
                Err(err)
            }
        }
    }
}
