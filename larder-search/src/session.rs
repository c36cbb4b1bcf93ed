//! Search session state machine.
//!
//! `SessionState` owns everything a search view renders and decides, with
//! no I/O of its own:
//!
//! ```text
//! Idle --set_term(non-blank)--> Debouncing --begin_fetch--> Fetching
//! Fetching --apply_page--> Settled      Fetching --apply_failure--> Failed
//! Settled --request_next_page--> Fetching      Failed --retry--> Fetching
//! any --set_term/set_mode--> Debouncing (or Idle when the term is blank)
//! Debouncing/Fetching --cancel_pending--> Settled (previous page)
//! ```
//!
//! Every term or mode change starts a new [`Generation`]. Fetches carry the
//! generation and page they were issued for, and their outcome is applied
//! only if both still match.

use std::time::Duration;

use larder_core::{BackendError, RecipeSummary, SearchMode, SearchQuery};

use crate::config::SearchConfig;

/// Identity of one `(term, mode)` pair within a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchPhase {
    /// Blank term; nothing to fetch.
    #[default]
    Idle,
    /// Waiting out the typing debounce.
    Debouncing,
    Fetching,
    /// Last fetch for this generation succeeded.
    Settled,
    /// Last fetch for this generation failed; results are unchanged.
    Failed,
}

impl SearchPhase {
    /// Debouncing or fetching.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Debouncing | Self::Fetching)
    }
}

/// What a view should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResults {
    /// The term is blank.
    Empty,
    /// A first page is on its way.
    Loading,
    /// Nothing matched the current term and mode.
    NoMatches,
    Recipes(Vec<RecipeSummary>),
}

impl SearchResults {
    pub fn recipes(&self) -> &[RecipeSummary] {
        match self {
            Self::Recipes(recipes) => recipes,
            _ => &[],
        }
    }
}

/// A fetch the caller should perform after `delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: Generation,
    pub query: SearchQuery,
    pub delay: Duration,
}

/// Effect of a session input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed.
    Unchanged,
    /// The session was reset to a blank term; pending work must be cancelled.
    Cleared,
    /// Pending work must be replaced by this fetch.
    Fetch(FetchTicket),
}

/// Published view of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSnapshot {
    pub term: String,
    pub mode: SearchMode,
    pub page: u32,
    pub has_more: bool,
    pub phase: SearchPhase,
    pub generation: Generation,
    pub results: SearchResults,
    pub last_error: Option<BackendError>,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    config: SearchConfig,
    term: String,
    mode: SearchMode,
    page: u32,
    buffer: Vec<RecipeSummary>,
    has_more: bool,
    generation: Generation,
    phase: SearchPhase,
    last_error: Option<BackendError>,
}

impl SessionState {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            term: String::new(),
            mode: SearchMode::default(),
            page: 1,
            buffer: Vec::new(),
            has_more: true,
            generation: Generation::default(),
            phase: SearchPhase::Idle,
            last_error: None,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn buffer(&self) -> &[RecipeSummary] {
        &self.buffer
    }

    pub fn last_error(&self) -> Option<&BackendError> {
        self.last_error.as_ref()
    }

    fn is_blank(&self) -> bool {
        self.term.trim().is_empty()
    }

    pub fn set_term(&mut self, term: impl Into<String>) -> Transition {
        let term = term.into();
        if term == self.term {
            return Transition::Unchanged;
        }
        self.term = term;
        self.restart()
    }

    pub fn set_mode(&mut self, mode: SearchMode) -> Transition {
        if mode == self.mode {
            return Transition::Unchanged;
        }
        self.mode = mode;
        self.restart()
    }

    /// New generation at page 1 with an empty buffer.
    fn restart(&mut self) -> Transition {
        self.generation = self.generation.next();
        self.page = 1;
        self.buffer.clear();
        self.has_more = true;
        self.last_error = None;

        if self.is_blank() {
            self.phase = SearchPhase::Idle;
            return Transition::Cleared;
        }
        self.phase = SearchPhase::Debouncing;
        Transition::Fetch(self.ticket())
    }

    /// Advance to the next page. A no-op while busy, at the end, for
    /// sessions without pagination, or for a blank term. After a failure
    /// the failed page is requested again instead.
    pub fn request_next_page(&mut self) -> Transition {
        let may_advance = self.config.paginate || self.page == 0;
        match self.phase {
            SearchPhase::Failed => self.retry(),
            SearchPhase::Settled if may_advance && self.has_more && !self.is_blank() => {
                self.page += 1;
                self.phase = SearchPhase::Fetching;
                Transition::Fetch(self.ticket())
            }
            _ => Transition::Unchanged,
        }
    }

    /// Re-issue the current page after a failure, without debounce.
    pub fn retry(&mut self) -> Transition {
        if self.phase != SearchPhase::Failed || self.is_blank() {
            return Transition::Unchanged;
        }
        self.phase = SearchPhase::Fetching;
        self.last_error = None;
        Transition::Fetch(FetchTicket {
            delay: Duration::ZERO,
            ..self.ticket()
        })
    }

    /// Abandon a debouncing or in-flight fetch. The page cursor moves back
    /// to the last loaded page and the session settles, so
    /// `request_next_page` asks for the abandoned page again. Returns false
    /// when nothing was pending.
    pub fn cancel_pending(&mut self) -> bool {
        if !self.phase.is_busy() {
            return false;
        }
        if self.is_blank() {
            self.phase = SearchPhase::Idle;
            return true;
        }
        self.page = self.page.saturating_sub(1);
        self.phase = SearchPhase::Settled;
        true
    }

    fn ticket(&self) -> FetchTicket {
        FetchTicket {
            generation: self.generation,
            query: SearchQuery::new(
                self.term.clone(),
                self.mode,
                self.page,
                self.config.page_size,
            ),
            delay: self.config.debounce_for(self.page),
        }
    }

    fn is_current(&self, generation: Generation, page: u32) -> bool {
        generation == self.generation && page == self.page
    }

    /// Mark the fetch for `(generation, page)` as sent. Returns false when
    /// that fetch has been superseded and must not be sent.
    pub fn begin_fetch(&mut self, generation: Generation, page: u32) -> bool {
        if !self.is_current(generation, page) || !self.phase.is_busy() {
            return false;
        }
        self.phase = SearchPhase::Fetching;
        true
    }

    /// Apply a successful page. Returns false (and changes nothing) when
    /// the response belongs to a superseded fetch.
    pub fn apply_page(
        &mut self,
        generation: Generation,
        page: u32,
        recipes: Vec<RecipeSummary>,
    ) -> bool {
        if !self.is_current(generation, page) || self.phase != SearchPhase::Fetching {
            return false;
        }
        // A full page implies more may exist; a total that is an exact
        // multiple of the page size costs one extra, empty fetch.
        self.has_more = recipes.len() == self.config.page_size as usize;
        if page == 1 {
            self.buffer = recipes;
        } else {
            self.buffer.extend(recipes);
        }
        self.phase = SearchPhase::Settled;
        self.last_error = None;
        true
    }

    /// Apply a failed fetch. Cancellations and superseded fetches are
    /// dropped. The buffer is never touched.
    pub fn apply_failure(&mut self, generation: Generation, page: u32, error: BackendError) -> bool {
        if error.is_cancelled()
            || !self.is_current(generation, page)
            || self.phase != SearchPhase::Fetching
        {
            return false;
        }
        self.phase = SearchPhase::Failed;
        self.last_error = Some(error);
        true
    }

    pub fn results(&self) -> SearchResults {
        // Page 0: the first page was cancelled before it loaded.
        if self.is_blank() || (self.page == 0 && self.buffer.is_empty()) {
            return SearchResults::Empty;
        }
        if !self.buffer.is_empty() {
            return SearchResults::Recipes(self.buffer.clone());
        }
        match self.phase {
            SearchPhase::Debouncing | SearchPhase::Fetching => SearchResults::Loading,
            _ => SearchResults::NoMatches,
        }
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        SearchSnapshot {
            term: self.term.clone(),
            mode: self.mode,
            page: self.page,
            has_more: self.has_more,
            phase: self.phase,
            generation: self.generation,
            results: self.results(),
            last_error: self.last_error.clone(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}
