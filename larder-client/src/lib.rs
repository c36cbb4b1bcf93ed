//! Larder Client
//!
//! HTTP implementation of [`larder_core::RecipeBackend`] on reqwest.

pub mod config;
pub mod rest;

pub use config::ClientConfig;
pub use rest::{ClientError, RestClient};
