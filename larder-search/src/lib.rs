//! Larder Search
//!
//! A search session drives the backend's three search variants with
//! typing debounce, stale-response suppression and page accumulation.
//!
//! - [`SessionState`] is the pure state machine: it decides what to fetch
//!   and whether a response still belongs to the session.
//! - [`Debouncer`] is the timer that delays and cancels fetches.
//! - [`SearchController`] wires both to a [`larder_core::RecipeBackend`].

pub mod config;
pub mod controller;
pub mod debounce;
pub mod session;

pub use config::SearchConfig;
pub use controller::SearchController;
pub use debounce::Debouncer;
pub use session::{
    FetchTicket, Generation, SearchPhase, SearchResults, SearchSnapshot, SessionState, Transition,
};
