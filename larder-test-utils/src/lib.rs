//! Larder Test Utilities
//!
//! Centralized test infrastructure for the Larder workspace:
//! - A scripted, call-recording mock of the recipe backend
//! - A manually driven clock
//! - Recipe and pantry fixtures
//! - Proptest generators for the core types

pub use larder_core::{
    BackendError, BackendResult, CancelHandle, CancelSignal, Clock, PantryItem, RecipeBackend,
    RecipeSummary, SearchMode, SearchQuery, TimestampMs, UserKey,
};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

// ============================================================================
// MOCK BACKEND
// ============================================================================

/// A call observed by [`MockBackend`], recorded at dispatch time.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    WhoAmI,
    Search(SearchQuery),
    Recommendations,
    Category(String),
    RandomRecipes,
    PantryItems,
    UpdatePantry(Vec<PantryItem>),
}

#[derive(Debug, Default)]
struct MockState {
    user: Option<String>,
    whoami_error: Option<BackendError>,
    search_results: HashMap<(SearchMode, String), Vec<RecipeSummary>>,
    search_delays: HashMap<String, Duration>,
    search_errors: HashMap<String, BackendError>,
    recommendations: Vec<RecipeSummary>,
    recommendations_error: Option<BackendError>,
    categories: HashMap<String, Vec<RecipeSummary>>,
    random: Vec<RecipeSummary>,
    pantry: Vec<PantryItem>,
    pantry_error: Option<BackendError>,
    calls: Vec<BackendCall>,
}

/// In-memory stand-in for the REST backend.
///
/// Search results are scripted per `(mode, term)` as one full result list;
/// the mock slices pages out of it using the query's `page`/`per_page`, so
/// pagination behaves like the real endpoint. Per-term delays run on tokio
/// time, so tests with a paused clock stay deterministic.
#[derive(Debug, Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_user(self, user: impl Into<String>) -> Self {
        self.state().user = Some(user.into());
        self
    }

    pub fn with_search_results(
        self,
        mode: SearchMode,
        term: impl Into<String>,
        recipes: Vec<RecipeSummary>,
    ) -> Self {
        self.set_search_results(mode, term, recipes);
        self
    }

    pub fn with_search_delay(self, term: impl Into<String>, delay: Duration) -> Self {
        self.state().search_delays.insert(term.into(), delay);
        self
    }

    pub fn with_recommendations(self, recipes: Vec<RecipeSummary>) -> Self {
        self.set_recommendations(recipes);
        self
    }

    pub fn with_category(self, name: impl Into<String>, recipes: Vec<RecipeSummary>) -> Self {
        self.state().categories.insert(name.into(), recipes);
        self
    }

    pub fn with_random(self, recipes: Vec<RecipeSummary>) -> Self {
        self.state().random = recipes;
        self
    }

    pub fn with_pantry(self, items: Vec<PantryItem>) -> Self {
        self.state().pantry = items;
        self
    }

    pub fn set_search_results(
        &self,
        mode: SearchMode,
        term: impl Into<String>,
        recipes: Vec<RecipeSummary>,
    ) {
        self.state()
            .search_results
            .insert((mode, term.into()), recipes);
    }

    pub fn fail_search(&self, term: impl Into<String>, error: BackendError) {
        self.state().search_errors.insert(term.into(), error);
    }

    pub fn clear_search_failure(&self, term: &str) {
        self.state().search_errors.remove(term);
    }

    pub fn set_recommendations(&self, recipes: Vec<RecipeSummary>) {
        let mut state = self.state();
        state.recommendations = recipes;
        state.recommendations_error = None;
    }

    pub fn fail_recommendations(&self, error: BackendError) {
        self.state().recommendations_error = Some(error);
    }

    pub fn fail_whoami(&self, error: BackendError) {
        self.state().whoami_error = Some(error);
    }

    pub fn fail_pantry(&self, error: BackendError) {
        self.state().pantry_error = Some(error);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.state().calls.clone()
    }

    pub fn search_calls(&self) -> Vec<SearchQuery> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::Search(query) => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn recommendation_calls(&self) -> usize {
        self.count(|call| matches!(call, BackendCall::Recommendations))
    }

    pub fn count(&self, predicate: impl Fn(&BackendCall) -> bool) -> usize {
        self.state().calls.iter().filter(|call| predicate(call)).count()
    }

    pub fn pantry(&self) -> Vec<PantryItem> {
        self.state().pantry.clone()
    }

    fn record(&self, call: BackendCall) {
        self.state().calls.push(call);
    }
}

fn page_of(recipes: &[RecipeSummary], page: u32, per_page: u32) -> Vec<RecipeSummary> {
    let per_page = per_page as usize;
    let start = (page.saturating_sub(1) as usize).saturating_mul(per_page);
    recipes.iter().skip(start).take(per_page).cloned().collect()
}

#[async_trait]
impl RecipeBackend for MockBackend {
    async fn whoami(&self) -> BackendResult<Option<String>> {
        self.record(BackendCall::WhoAmI);
        let state = self.state();
        match &state.whoami_error {
            Some(err) => Err(err.clone()),
            None => Ok(state.user.clone()),
        }
    }

    async fn search(
        &self,
        query: &SearchQuery,
        cancel: &CancelSignal,
    ) -> BackendResult<Vec<RecipeSummary>> {
        self.record(BackendCall::Search(query.clone()));
        let delay = self.state().search_delays.get(&query.term).copied();
        if let Some(delay) = delay {
            cancel.guard(tokio::time::sleep(delay)).await?;
        }
        if cancel.is_cancelled() {
            return Err(BackendError::Cancelled);
        }

        let state = self.state();
        if let Some(err) = state.search_errors.get(&query.term) {
            return Err(err.clone());
        }
        let recipes = state
            .search_results
            .get(&(query.mode, query.term.clone()))
            .map(|all| page_of(all, query.page, query.per_page))
            .unwrap_or_default();
        Ok(recipes)
    }

    async fn recommendations(&self) -> BackendResult<Vec<RecipeSummary>> {
        self.record(BackendCall::Recommendations);
        let state = self.state();
        match &state.recommendations_error {
            Some(err) => Err(err.clone()),
            None => Ok(state.recommendations.clone()),
        }
    }

    async fn category(&self, name: &str) -> BackendResult<Vec<RecipeSummary>> {
        self.record(BackendCall::Category(name.to_string()));
        self.state()
            .categories
            .get(name)
            .cloned()
            .ok_or_else(|| BackendError::Status {
                status: 404,
                message: format!("unknown category {}", name),
            })
    }

    async fn random_recipes(&self) -> BackendResult<Vec<RecipeSummary>> {
        self.record(BackendCall::RandomRecipes);
        Ok(self.state().random.clone())
    }

    async fn pantry_items(&self) -> BackendResult<Vec<PantryItem>> {
        self.record(BackendCall::PantryItems);
        let state = self.state();
        match &state.pantry_error {
            Some(err) => Err(err.clone()),
            None => Ok(state.pantry.clone()),
        }
    }

    async fn update_pantry(&self, items: &[PantryItem]) -> BackendResult<()> {
        self.record(BackendCall::UpdatePantry(items.to_vec()));
        let mut state = self.state();
        if let Some(err) = &state.pantry_error {
            return Err(err.clone());
        }
        for item in items {
            state.pantry.retain(|existing| existing.name != item.name);
            if !item.is_removal() {
                state.pantry.push(item.clone());
            }
        }
        Ok(())
    }
}

// ============================================================================
// CLOCK
// ============================================================================

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: TimestampMs) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
        }
    }

    pub fn advance(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: TimestampMs) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(1_700_000_000_000)
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> TimestampMs {
        self.now.load(Ordering::SeqCst)
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub fn recipe(id: i64) -> RecipeSummary {
    RecipeSummary::new(id, format!("Recipe {}", id))
        .with_image(format!("https://img.larder.test/{}.jpg", id))
}

/// Recipes with ids `first..first + count`.
pub fn recipes(first: i64, count: usize) -> Vec<RecipeSummary> {
    (first..first + count as i64).map(recipe).collect()
}

pub fn ids(recipes: &[RecipeSummary]) -> Vec<i64> {
    recipes.iter().map(|r| r.id).collect()
}

/// Multiset comparison helper for shuffled payloads.
pub fn sorted_ids(recipes: &[RecipeSummary]) -> Vec<i64> {
    let mut ids = ids(recipes);
    ids.sort_unstable();
    ids
}

pub fn pantry_item(name: &str, amount: f64) -> PantryItem {
    PantryItem::new(name, amount, "cups")
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod strategies {
    use super::*;
    use proptest::prelude::*;

    pub fn arb_recipe() -> impl Strategy<Value = RecipeSummary> {
        (1i64..100_000, "[A-Za-z ]{1,24}", proptest::option::of("[a-z]{1,12}\\.png")).prop_map(
            |(id, name, image)| RecipeSummary {
                id,
                name,
                image,
            },
        )
    }

    pub fn arb_recipes(max: usize) -> impl Strategy<Value = Vec<RecipeSummary>> {
        proptest::collection::vec(arb_recipe(), 0..=max)
    }

    pub fn arb_user_key() -> impl Strategy<Value = UserKey> {
        prop_oneof![
            Just(UserKey::Guest),
            "[a-z][a-z0-9_.]{0,15}".prop_map(UserKey::User),
        ]
    }

    pub fn arb_search_mode() -> impl Strategy<Value = SearchMode> {
        prop_oneof![
            Just(SearchMode::All),
            Just(SearchMode::ByIngredients),
            Just(SearchMode::ByName),
        ]
    }
}
