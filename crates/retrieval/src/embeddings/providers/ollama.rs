//! Ollama embedding provider.
//!
//! Calls the local `/api/embeddings` endpoint once per text. Retries are
//! left to the caller's [`RetryPolicy`](crate::retry::RetryPolicy) so a
//! failing query is not retried twice over.

use crate::embeddings::EmbeddingProvider;
use async_trait::async_trait;
use lectern_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

/// Ollama embedding provider using the local HTTP API.
#[derive(Debug, Clone)]
pub struct OllamaEmbeddingProvider {
    client: Client,
    base_url: String,
    model: String,
    /// Dimensionality of the loaded index; responses must match it
    dimensions: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaEmbeddingProvider {
    pub fn new(
        base_url: &str,
        model: &str,
        dimensions: usize,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            AppError::Embedding(format!("Failed to create HTTP client for Ollama: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimensions,
        })
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), model = %self.model))]
    async fn embed_single(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to send request to Ollama: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|e| e.error)
                .unwrap_or(error_text);

            return Err(AppError::Embedding(format!(
                "Ollama API error ({}): {}",
                status, message
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to parse Ollama response: {}", e)))?;

        if body.embedding.len() != self.dimensions {
            return Err(AppError::DimensionMismatch {
                expected: self.dimensions,
                actual: body.embedding.len(),
            });
        }

        Ok(body.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), provider = "ollama"))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed_single(text).await?);
        }
        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer, dimensions: usize) -> OllamaEmbeddingProvider {
        OllamaEmbeddingProvider::new(
            &server.uri(),
            "nomic-embed-text",
            dimensions,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_embed_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .and(body_partial_json(serde_json::json!({
                "model": "nomic-embed-text",
                "prompt": "hello"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "embedding": [0.1, 0.2, 0.3] })),
            )
            .mount(&server)
            .await;

        let embedding = provider(&server, 3).embed("hello").await.unwrap();
        assert_eq!(embedding, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_embed_dimension_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "embedding": [0.1, 0.2] })),
            )
            .mount(&server)
            .await;

        let err = provider(&server, 3).embed("hello").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_embed_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({ "error": "model not found" })),
            )
            .mount(&server)
            .await;

        let err = provider(&server, 3).embed("hello").await.unwrap_err();
        assert!(matches!(err, AppError::Embedding(_)));
        assert!(err.to_string().contains("model not found"));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let provider = OllamaEmbeddingProvider::new(
            "http://localhost:11434/",
            "m",
            8,
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(provider.base_url, "http://localhost:11434");
    }
}
