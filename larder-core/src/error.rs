//! Error types for Larder operations

use thiserror::Error;

/// Backend client errors.
///
/// Every failure the REST layer can produce is normalized into one of these
/// variants before it crosses the [`crate::RecipeBackend`] seam.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("Transport failure: {reason}")]
    Transport { reason: String },

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {reason}")]
    InvalidResponse { reason: String },

    #[error("Request rejected: {message}")]
    Rejected { message: String },

    #[error("Request cancelled")]
    Cancelled,
}

impl BackendError {
    /// Returns true for superseded requests, which are never user-visible.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Key-value store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store I/O error: {reason}")]
    Io { reason: String },

    #[error("Store transaction failed: {reason}")]
    Transaction { reason: String },

    #[error("Corrupt entry at {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Master error type for all Larder errors.
#[derive(Debug, Clone, Error)]
pub enum LarderError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for Larder operations.
pub type LarderResult<T> = Result<T, LarderError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display_status() {
        let err = BackendError::Status {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");
    }

    #[test]
    fn test_cancelled_is_flagged() {
        assert!(BackendError::Cancelled.is_cancelled());
        assert!(!BackendError::rejected("nope").is_cancelled());
    }

    #[test]
    fn test_larder_error_from_store() {
        let err: LarderError = StoreError::Corrupt {
            key: "guest.recommendations_cache".to_string(),
            reason: "not json".to_string(),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.contains("Store error"));
        assert!(msg.contains("guest.recommendations_cache"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            field: "search.debounce_ms".to_string(),
            reason: "must be <= 5000".to_string(),
        };
        assert!(err.to_string().contains("search.debounce_ms"));
    }
}
