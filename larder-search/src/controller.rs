//! Search controller: a [`SessionState`] driven against a backend.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use larder_core::{CancelSignal, RecipeBackend, SearchMode};
use tokio::sync::watch;

use crate::config::SearchConfig;
use crate::debounce::Debouncer;
use crate::session::{FetchTicket, SearchResults, SearchSnapshot, SessionState, Transition};

struct Shared<B: ?Sized> {
    backend: Arc<B>,
    state: Mutex<SessionState>,
    snapshots: watch::Sender<SearchSnapshot>,
}

impl<B> Shared<B>
where
    B: RecipeBackend + ?Sized,
{
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &SessionState) {
        self.snapshots.send_replace(state.snapshot());
    }

    async fn run(&self, ticket: FetchTicket, cancel: CancelSignal) {
        let FetchTicket {
            generation, query, ..
        } = ticket;

        {
            let mut state = self.state();
            if !state.begin_fetch(generation, query.page) {
                return;
            }
            self.publish(&state);
        }

        tracing::debug!(
            generation = generation.as_u64(),
            mode = %query.mode,
            page = query.page,
            "Search request sent"
        );
        let outcome = self.backend.search(&query, &cancel).await;

        let mut state = self.state();
        let applied = match outcome {
            Ok(recipes) => {
                let count = recipes.len();
                let applied = state.apply_page(generation, query.page, recipes);
                if applied {
                    tracing::debug!(
                        generation = generation.as_u64(),
                        page = query.page,
                        count,
                        has_more = state.has_more(),
                        "Search page applied"
                    );
                }
                applied
            }
            Err(err) if err.is_cancelled() => false,
            Err(err) => {
                let applied = state.apply_failure(generation, query.page, err.clone());
                if applied {
                    tracing::warn!(
                        generation = generation.as_u64(),
                        page = query.page,
                        error = %err,
                        "Search request failed"
                    );
                }
                applied
            }
        };

        if applied {
            self.publish(&state);
        } else {
            tracing::debug!(
                generation = generation.as_u64(),
                page = query.page,
                "Discarded superseded search response"
            );
        }
    }
}

/// One search session against a [`RecipeBackend`].
///
/// Inputs (`set_term`, `set_mode`, `request_next_page`, `retry`) are
/// synchronous and must be called from within a tokio runtime; fetches run
/// on spawned tasks. Observe progress with [`Self::snapshot`] or
/// [`Self::subscribe`]. Dropping the controller cancels pending work.
pub struct SearchController<B: ?Sized> {
    shared: Arc<Shared<B>>,
    debouncer: Mutex<Debouncer>,
}

impl<B> SearchController<B>
where
    B: RecipeBackend + ?Sized + 'static,
{
    pub fn new(backend: Arc<B>, config: SearchConfig) -> Self {
        let state = SessionState::new(config);
        let (snapshots, _) = watch::channel(state.snapshot());
        Self {
            shared: Arc::new(Shared {
                backend,
                state: Mutex::new(state),
                snapshots,
            }),
            debouncer: Mutex::new(Debouncer::new()),
        }
    }

    /// Preview session: small pages, no pagination.
    pub fn preview(backend: Arc<B>) -> Self {
        Self::new(backend, SearchConfig::preview())
    }

    /// Results-page session: large pages, paginated.
    pub fn results_page(backend: Arc<B>) -> Self {
        Self::new(backend, SearchConfig::results_page())
    }

    pub fn set_term(&self, term: impl Into<String>) {
        let term = term.into();
        self.drive(|state| state.set_term(term));
    }

    pub fn set_mode(&self, mode: SearchMode) {
        self.drive(|state| state.set_mode(mode));
    }

    pub fn request_next_page(&self) {
        self.drive(SessionState::request_next_page);
    }

    pub fn retry(&self) {
        self.drive(SessionState::retry);
    }

    /// Cancel pending work without changing the term. A busy session
    /// settles on the pages it already has; `request_next_page` fetches
    /// the abandoned page again.
    pub fn cancel(&self) {
        let mut debouncer = self.debouncer();
        debouncer.cancel();
        let mut state = self.shared.state();
        if state.cancel_pending() {
            tracing::debug!(
                generation = state.generation().as_u64(),
                page = state.page(),
                "Pending search cancelled"
            );
            self.shared.publish(&state);
        }
    }

    pub fn results(&self) -> SearchResults {
        self.shared.state().results()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.shared.state().snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.shared.snapshots.subscribe()
    }

    /// Wait until the session is neither debouncing nor fetching.
    pub async fn settled(&self) -> SearchSnapshot {
        let mut rx = self.subscribe();
        let snapshot = match rx.wait_for(|snapshot| !snapshot.phase.is_busy()).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        };
        snapshot
    }

    fn debouncer(&self) -> MutexGuard<'_, Debouncer> {
        self.debouncer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply one input and schedule its effect. The debouncer lock is held
    /// across both so concurrent inputs schedule in the order they applied.
    fn drive(&self, input: impl FnOnce(&mut SessionState) -> Transition) {
        let mut debouncer = self.debouncer();
        let transition = {
            let mut state = self.shared.state();
            let transition = input(&mut state);
            if transition != Transition::Unchanged {
                self.shared.publish(&state);
            }
            transition
        };

        match transition {
            Transition::Unchanged => {}
            Transition::Cleared => debouncer.cancel(),
            Transition::Fetch(ticket) => {
                let shared = Arc::clone(&self.shared);
                debouncer.schedule(ticket.delay, move |cancel| async move {
                    shared.run(ticket, cancel).await;
                });
            }
        }
    }
}
