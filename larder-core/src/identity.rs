//! Identity and time types for Larder

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Milliseconds since the Unix epoch.
pub type TimestampMs = i64;

/// Sentinel scope used for anonymous sessions.
pub const GUEST_SCOPE: &str = "guest";

/// Owner of a cache entry: an authenticated user or the guest identity.
///
/// Guests and users live in separate variants so that a user literally
/// named "guest" can never share cache entries with anonymous sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserKey {
    #[default]
    Guest,
    User(String),
}

impl UserKey {
    /// Build a key for a named user. Blank names fall back to the guest.
    pub fn user(name: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim();
        if name.is_empty() {
            Self::Guest
        } else {
            Self::User(name.to_string())
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }

    /// Storage scope for this identity. Users are prefixed so they cannot
    /// collide with [`GUEST_SCOPE`].
    pub fn scope(&self) -> String {
        match self {
            Self::Guest => GUEST_SCOPE.to_string(),
            Self::User(name) => format!("user.{}", name),
        }
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guest => f.write_str(GUEST_SCOPE),
            Self::User(name) => f.write_str(name),
        }
    }
}

/// Source of "now" for cache and invalidation timestamps.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> TimestampMs;
}

/// Wall clock backed by chrono.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> TimestampMs {
        Utc::now().timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_user_is_guest() {
        assert_eq!(UserKey::user("   "), UserKey::Guest);
        assert_eq!(UserKey::user(" alice "), UserKey::User("alice".to_string()));
    }

    #[test]
    fn test_user_named_guest_has_distinct_scope() {
        assert_ne!(UserKey::user("guest").scope(), UserKey::Guest.scope());
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        assert!(SystemClock.now_ms() > 1_577_836_800_000);
    }
}
