//! Client for the model server's OpenAI-compatible API.

use crate::config::ServerSettings;
use crate::error::{DocsageError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create a client for the configured model server.
///
/// Ollama serves the OpenAI API under `/v1` and ignores the key, but the
/// client still sends one.
pub fn create_client(server: &ServerSettings) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(server.request_timeout_secs))
        .build()
        .map_err(|e| DocsageError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new()
        .with_api_base(server.api_base())
        .with_api_key(server.api_key.clone());

    Ok(Client::with_config(config).with_http_client(http_client))
}
