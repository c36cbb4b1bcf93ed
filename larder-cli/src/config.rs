//! Configuration loading for the larder CLI.
//!
//! Every section is optional and falls back to the defaults below. Values
//! are validated after parsing; the first invalid field is reported.

use std::path::{Path, PathBuf};
use std::time::Duration;

use larder_client::ClientConfig;
use larder_core::ConfigError;
use larder_search::SearchConfig;
use larder_session::HomeConfig;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

const MAX_DEBOUNCE_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LarderConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub home: HomeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Raw `Cookie` header for an existing backend session.
    pub session_cookie: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SearchSettings {
    pub debounce_ms: u64,
    pub preview_page_size: u32,
    pub results_page_size: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        let preview = SearchConfig::preview();
        Self {
            debounce_ms: preview.debounce.as_millis() as u64,
            preview_page_size: preview.page_size,
            results_page_size: SearchConfig::results_page().page_size,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    #[default]
    Memory,
    Lmdb,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CacheSettings {
    pub backend: CacheBackendKind,
    pub path: Option<PathBuf>,
    pub max_size_mb: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::Memory,
            path: None,
            max_size_mb: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives. `RUST_LOG` wins when set.
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn,larder=info".to_string(),
            json: false,
        }
    }
}

fn default_api_base_url() -> String {
    ClientConfig::default().api_base_url
}

fn default_request_timeout_ms() -> u64 {
    ClientConfig::default().request_timeout_ms
}

impl Default for LarderConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            auth: AuthConfig::default(),
            search: SearchSettings::default(),
            cache: CacheSettings::default(),
            home: HomeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl LarderConfig {
    /// Load from `path`, or use defaults when no path was given.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let config = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, CliError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CliError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.client_config().validate()?;

        if self.search.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(invalid(
                "search.debounce_ms",
                format!("must be <= {}", MAX_DEBOUNCE_MS),
            ));
        }
        if self.search.preview_page_size == 0 {
            return Err(invalid("search.preview_page_size", "must be > 0"));
        }
        if self.search.results_page_size == 0 {
            return Err(invalid("search.results_page_size", "must be > 0"));
        }
        if self.cache.backend == CacheBackendKind::Lmdb {
            match &self.cache.path {
                None => {
                    return Err(ConfigError::MissingRequired {
                        field: "cache.path".to_string(),
                    })
                }
                Some(path) if path.as_os_str().is_empty() => {
                    return Err(invalid("cache.path", "must not be empty"));
                }
                Some(_) => {}
            }
        }
        if self.cache.max_size_mb == 0 {
            return Err(invalid("cache.max_size_mb", "must be > 0"));
        }
        if self.home.category_count == 0 {
            return Err(invalid("home.category_count", "must be > 0"));
        }
        if self.home.categories.iter().all(|c| c.trim().is_empty()) {
            return Err(invalid("home.categories", "must name at least one category"));
        }
        if let Err(err) = EnvFilter::try_new(&self.logging.filter) {
            return Err(invalid("logging.filter", err.to_string()));
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_base_url: self.api_base_url.clone(),
            request_timeout_ms: self.request_timeout_ms,
            session_cookie: self.auth.session_cookie.clone(),
        }
    }

    pub fn preview_search(&self) -> SearchConfig {
        SearchConfig::preview()
            .with_page_size(self.search.preview_page_size)
            .with_debounce(Duration::from_millis(self.search.debounce_ms))
    }

    pub fn results_search(&self) -> SearchConfig {
        SearchConfig::results_page()
            .with_page_size(self.search.results_page_size)
            .with_debounce(Duration::from_millis(self.search.debounce_ms))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}
