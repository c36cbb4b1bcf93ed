//! User-scoped store keys.
//!
//! `UserScopedKey`'s private inner struct means a store key cannot exist
//! without an owner, so two users (or a user and the guest) can only share
//! an entry if their [`UserKey`]s are equal.

use larder_core::{UserKey, GUEST_SCOPE};
use std::fmt;

/// Separator between the user scope and the purpose.
const SEPARATOR: char = '/';

/// Prefix the user scope carries for named users.
const USER_PREFIX: &str = "user.";

/// What a stored value is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachePurpose {
    /// JSON array of recommended recipe summaries.
    RecommendationPayload,
    /// Millisecond timestamp of the payload fetch.
    RecommendationTimestamp,
    /// Millisecond timestamp of the last pantry mutation.
    PantryInvalidation,
}

impl CachePurpose {
    pub const ALL: [CachePurpose; 3] = [
        Self::RecommendationPayload,
        Self::RecommendationTimestamp,
        Self::PantryInvalidation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RecommendationPayload => "recommendations_cache",
            Self::RecommendationTimestamp => "recommendations_cache_time",
            Self::PantryInvalidation => "pantry_last_updated",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|purpose| purpose.as_str() == s)
    }
}

/// A store key that is scoped to a specific user.
///
/// # Format
///
/// `<scope>/<purpose>`, where scope is `guest` for anonymous sessions and
/// `user.<name>` otherwise. Purposes never contain the separator, so the
/// last `/` always splits the two halves even when a user name contains one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserScopedKey {
    /// Private inner data - cannot be constructed externally
    inner: UserKeyInner,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct UserKeyInner {
    user: UserKey,
    purpose: CachePurpose,
}

impl UserScopedKey {
    /// Create a new user-scoped key. This is the ONLY way to build one.
    pub fn new(user: &UserKey, purpose: CachePurpose) -> Self {
        Self {
            inner: UserKeyInner {
                user: user.clone(),
                purpose,
            },
        }
    }

    pub fn user(&self) -> &UserKey {
        &self.inner.user
    }

    pub fn purpose(&self) -> CachePurpose {
        self.inner.purpose
    }

    /// Encode to the string form used by the key-value store.
    pub fn encode(&self) -> String {
        format!(
            "{}{}{}",
            self.inner.user.scope(),
            SEPARATOR,
            self.inner.purpose.as_str()
        )
    }

    /// Decode a store key.
    ///
    /// Returns `None` for keys that were not produced by [`Self::encode`].
    pub fn decode(key: &str) -> Option<Self> {
        let (scope, purpose) = key.rsplit_once(SEPARATOR)?;
        let purpose = CachePurpose::parse(purpose)?;
        let user = if scope == GUEST_SCOPE {
            UserKey::Guest
        } else {
            let name = scope.strip_prefix(USER_PREFIX)?;
            if name.is_empty() {
                return None;
            }
            UserKey::User(name.to_string())
        };
        Some(Self::new(&user, purpose))
    }

    /// Every key `user` can own, one per purpose.
    pub fn all_for(user: &UserKey) -> impl Iterator<Item = Self> + '_ {
        CachePurpose::ALL
            .into_iter()
            .map(move |purpose| Self::new(user, purpose))
    }
}

impl fmt::Display for UserScopedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
