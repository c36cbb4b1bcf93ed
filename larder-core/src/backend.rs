//! The backend contract consumed by the cache and the search controller.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cancel::CancelSignal;
use crate::error::BackendError;
use crate::recipe::{PantryItem, RecipeSummary, SearchQuery};

/// Result alias for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Remote recipe API.
///
/// Implementations normalize the server's `{success, ...}` envelopes: a
/// `success: false` answer becomes [`BackendError::Rejected`] and a missing
/// list on success becomes an empty vec. Session identity is ambient to the
/// implementation (cookies, headers) and never passed per call.
#[async_trait]
pub trait RecipeBackend: Send + Sync {
    /// Name of the logged-in user, or `None` for an anonymous session.
    async fn whoami(&self) -> BackendResult<Option<String>>;

    /// One page from the search variant selected by `query.mode`.
    ///
    /// Implementations should stop waiting once `cancel` fires and return
    /// [`BackendError::Cancelled`].
    async fn search(
        &self,
        query: &SearchQuery,
        cancel: &CancelSignal,
    ) -> BackendResult<Vec<RecipeSummary>>;

    /// Pantry-driven recommendations for the current session.
    async fn recommendations(&self) -> BackendResult<Vec<RecipeSummary>>;

    /// First page of a recipe category.
    async fn category(&self, name: &str) -> BackendResult<Vec<RecipeSummary>>;

    async fn random_recipes(&self) -> BackendResult<Vec<RecipeSummary>>;

    async fn pantry_items(&self) -> BackendResult<Vec<PantryItem>>;

    /// Upsert pantry lines; lines with a zero amount are deleted.
    async fn update_pantry(&self, items: &[PantryItem]) -> BackendResult<()>;
}

#[async_trait]
impl<B> RecipeBackend for Arc<B>
where
    B: RecipeBackend + ?Sized,
{
    async fn whoami(&self) -> BackendResult<Option<String>> {
        (**self).whoami().await
    }

    async fn search(
        &self,
        query: &SearchQuery,
        cancel: &CancelSignal,
    ) -> BackendResult<Vec<RecipeSummary>> {
        (**self).search(query, cancel).await
    }

    async fn recommendations(&self) -> BackendResult<Vec<RecipeSummary>> {
        (**self).recommendations().await
    }

    async fn category(&self, name: &str) -> BackendResult<Vec<RecipeSummary>> {
        (**self).category(name).await
    }

    async fn random_recipes(&self) -> BackendResult<Vec<RecipeSummary>> {
        (**self).random_recipes().await
    }

    async fn pantry_items(&self) -> BackendResult<Vec<PantryItem>> {
        (**self).pantry_items().await
    }

    async fn update_pantry(&self, items: &[PantryItem]) -> BackendResult<()> {
        (**self).update_pantry(items).await
    }
}
