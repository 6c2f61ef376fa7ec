//! LLM provider factory.
//!
//! Builds the configured generation client with its endpoint, secret and
//! request deadline applied.

use crate::client::LlmClient;
use crate::providers::{GeminiClient, OllamaClient};
use crate::types::ProviderType;
use lectern_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama", "gemini")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required for gemini)
/// * `timeout` - Deadline for each request
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown, a required key is
/// missing, or the HTTP client cannot be built.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    match provider_type {
        ProviderType::Ollama => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            let client = OllamaClient::with_base_url(base_url).with_timeout(timeout)?;
            Ok(Arc::new(client))
        }
        ProviderType::Gemini => {
            let key = api_key.ok_or_else(|| {
                AppError::Config("Gemini provider requires API key".to_string())
            })?;
            let base_url = endpoint.unwrap_or(crate::providers::gemini::DEFAULT_GEMINI_ENDPOINT);
            let client = GeminiClient::with_base_url(base_url, key).with_timeout(timeout)?;
            Ok(Arc::new(client))
        }
    }
}
