//! LLM client abstraction and request/response types.
//!
//! This module defines the core abstractions for interacting with multimodal
//! generation providers: a text prompt plus optional inline images in, text out.

use lectern_core::AppResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An inline image attached to a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePart {
    /// Raw image bytes (providers encode as needed)
    pub data: Vec<u8>,

    /// MIME type, e.g. "image/png"
    pub mime_type: String,
}

impl ImagePart {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    /// Read an image from disk, inferring its MIME type from the extension.
    pub async fn from_path(path: &Path) -> AppResult<Self> {
        let data = tokio::fs::read(path).await?;
        Ok(Self::new(data, Self::mime_for_path(path)))
    }

    /// `image/jpeg` for .jpg/.jpeg (any case), `image/png` for everything else.
    pub fn mime_for_path(path: &Path) -> &'static str {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("jpg") | Some("jpeg") => "image/jpeg",
            _ => "image/png",
        }
    }
}

/// LLM completion request.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// The prompt text to send to the LLM
    pub prompt: String,

    /// Model identifier (e.g., "llava", "gemini-2.5-pro")
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,

    /// Temperature for sampling (0.0 - 2.0)
    pub temperature: Option<f32>,

    /// System prompt (optional)
    pub system: Option<String>,

    /// Images sent alongside the prompt, in order
    pub images: Vec<ImagePart>,
}

impl LlmRequest {
    /// Create a new LLM request with required fields.
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            max_tokens: None,
            temperature: None,
            system: None,
            images: Vec::new(),
        }
    }

    /// Set the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the temperature for sampling.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the system prompt.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Attach an image.
    pub fn with_image(mut self, image: ImagePart) -> Self {
        self.images.push(image);
        self
    }
}

/// LLM completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The generated text
    pub content: String,

    /// Model that generated the response
    pub model: String,

    /// Usage statistics
    pub usage: LlmUsage,
}

/// Token usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmUsage {
    /// Tokens in the prompt
    #[serde(default)]
    pub prompt_tokens: u32,

    /// Tokens in the completion
    #[serde(default)]
    pub completion_tokens: u32,

    /// Total tokens used
    #[serde(default)]
    pub total_tokens: u32,
}

impl LlmUsage {
    /// Create usage stats from prompt and completion token counts.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Trait for generation providers.
///
/// Implementations perform one request per call. Callers own any retry or
/// fallback policy.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Get the provider name (e.g., "ollama", "gemini").
    fn provider_name(&self) -> &str;

    /// Perform a completion.
    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse>;
}
