//! Ollama LLM provider implementation.
//!
//! This module provides integration with Ollama, a local LLM runtime.
//! Multimodal models (e.g. llava) receive images as base64 strings.
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use base64::Engine as _;
use lectern_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama API request format.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
    stream: bool,
}

#[derive(Debug, Serialize, PartialEq)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Ollama API response format.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    model: String,
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// Ollama LLM client.
pub struct OllamaClient {
    /// Base URL for Ollama API
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new Ollama client with default settings.
    ///
    /// Default URL: http://localhost:11434
    pub fn new() -> Self {
        Self::with_base_url("http://localhost:11434")
    }

    /// Create a new Ollama client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Apply a per-request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> AppResult<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(self)
    }

    /// Convert LlmRequest to Ollama format.
    fn to_ollama_request(&self, request: &LlmRequest) -> OllamaRequest {
        let options = if request.temperature.is_some() || request.max_tokens.is_some() {
            Some(OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            })
        } else {
            None
        };

        OllamaRequest {
            model: request.model.clone(),
            prompt: request.prompt.clone(),
            system: request.system.clone(),
            images: request
                .images
                .iter()
                .map(|image| base64::engine::general_purpose::STANDARD.encode(&image.data))
                .collect(),
            options,
            stream: false,
        }
    }

    /// Convert Ollama response to LlmResponse.
    fn convert_response(&self, response: OllamaResponse) -> LlmResponse {
        let usage = LlmUsage::new(
            response.prompt_eval_count.unwrap_or(0),
            response.eval_count.unwrap_or(0),
        );

        LlmResponse {
            content: response.response,
            model: response.model,
            usage,
        }
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!(
            model = %request.model,
            images = request.images.len(),
            "Sending completion request to Ollama"
        );

        let ollama_request = self.to_ollama_request(request);
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ollama_request)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Ollama response: {}", e)))?;

        tracing::debug!(
            chars = ollama_response.response.len(),
            "Received completion from Ollama"
        );

        Ok(self.convert_response(ollama_response))
    }
}
