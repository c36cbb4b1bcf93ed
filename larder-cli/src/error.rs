//! Error type for the larder binary.

use std::path::PathBuf;

use larder_client::ClientError;
use larder_core::{BackendError, ConfigError};
use larder_storage::LmdbStoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read config file {}: {source}", path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config TOML: {0}")]
    ParseConfig(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Client setup failed: {0}")]
    Client(#[from] ClientError),

    #[error("{0}")]
    Backend(#[from] BackendError),

    #[error("Cache store unavailable: {0}")]
    Store(#[from] LmdbStoreError),

    #[error("Failed to initialize logging: {0}")]
    Telemetry(String),
}
