//! Larder Session
//!
//! Per-user coordination around the recommendation cache: who the user
//! is, pantry changes that invalidate their recommendations, and the home
//! feed that shows them.

pub mod home;
pub mod identity;
pub mod pantry;

pub use home::{CategoryShelf, HomeConfig, HomeData, HomeFeed, DEFAULT_CATEGORIES};
pub use identity::resolve_user;
pub use pantry::PantryService;
