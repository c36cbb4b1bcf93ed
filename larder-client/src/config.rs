//! Connection settings for [`crate::RestClient`].

use larder_core::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Raw `Cookie` header value identifying the session. Opaque.
    #[serde(default)]
    pub session_cookie: Option<String>,
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_ms: default_request_timeout_ms(),
            session_cookie: None,
        }
    }
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "api_base_url".to_string(),
            });
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url".to_string(),
                reason: "must start with http:// or https://".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if let Some(cookie) = &self.session_cookie {
            if cookie.trim().is_empty() || cookie.contains(['\r', '\n']) {
                return Err(ConfigError::InvalidValue {
                    field: "auth.session_cookie".to_string(),
                    reason: "must be a non-empty single-line header value".to_string(),
                });
            }
        }
        Ok(())
    }
}
