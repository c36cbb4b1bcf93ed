//! Larder Core - Shared Types
//!
//! Data types, the backend contract and the error taxonomy used by every
//! other Larder crate. No I/O lives here.

pub mod backend;
pub mod cancel;
pub mod error;
pub mod identity;
pub mod recipe;

pub use backend::{BackendResult, RecipeBackend};
pub use cancel::{CancelHandle, CancelSignal};
pub use error::{BackendError, ConfigError, LarderError, LarderResult, StoreError};
pub use identity::{Clock, SystemClock, TimestampMs, UserKey, GUEST_SCOPE};
pub use recipe::{PantryItem, RecipeId, RecipeSummary, SearchMode, SearchQuery};
