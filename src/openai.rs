//! OpenAI-compatible client construction.
//!
//! The client is built once at startup from [`CompletionSettings`] and shared
//! by every component that talks to the API.

use crate::config::CompletionSettings;
use crate::error::{ClipquizError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Shared client type.
pub type OpenAIClient = Client<OpenAIConfig>;

/// Create a client for the configured endpoint, reading the API key from the
/// configured environment variable.
pub fn create_client(settings: &CompletionSettings) -> Result<OpenAIClient> {
    let api_key = std::env::var(&settings.api_key_env)
        .ok()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            ClipquizError::Config(format!(
                "{} not set. Set it with: export {}='...'",
                settings.api_key_env, settings.api_key_env
            ))
        })?;

    create_client_with_key(settings, &api_key)
}

/// Create a client with an explicit API key.
pub fn create_client_with_key(settings: &CompletionSettings, api_key: &str) -> Result<OpenAIClient> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_seconds))
        .build()
        .map_err(|e| ClipquizError::Config(format!("Failed to create HTTP client: {e}")))?;

    let config = OpenAIConfig::new()
        .with_api_base(&settings.api_base)
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}
