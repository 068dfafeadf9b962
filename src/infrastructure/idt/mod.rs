//! IDT integration - OAuth token lifecycle and CRISPR design API

pub mod auth;
pub mod client;
pub mod models;

pub use auth::TokenProvider;
pub use client::IdtClient;

use std::time::Duration;
use crate::application::errors::ConfigError;
use crate::infrastructure::config::IdtConfig;

/// Shared HTTP client for the token and design endpoints.
/// Requests that exceed the configured timeout fail instead of hanging.
pub fn build_http_client(config: &IdtConfig) -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(concat!("crispr-bot/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ConfigError::InvalidValue(format!("HTTP client: {}", e)))
}
