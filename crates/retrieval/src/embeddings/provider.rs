//! Embedding provider trait and factory.

use super::fallback::FallbackProvider;
use super::providers::hashing::HashingProvider;
use super::providers::ollama::OllamaEmbeddingProvider;
use lectern_core::config::EmbeddingSettings;
use lectern_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "hashing", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

/// Create the query embedder for an index of the given dimensionality.
///
/// With `fallback` enabled a remote provider is wrapped so that failures
/// degrade to the deterministic hashing embedder.
pub fn create_provider(
    settings: &EmbeddingSettings,
    dimensions: usize,
    timeout: Duration,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match settings.provider.as_str() {
        "hashing" => Ok(Arc::new(HashingProvider::new(dimensions))),

        "ollama" => {
            let remote = OllamaEmbeddingProvider::new(
                &settings.endpoint,
                &settings.model,
                dimensions,
                timeout,
            )?;
            if settings.fallback {
                Ok(Arc::new(FallbackProvider::new(
                    Arc::new(remote),
                    HashingProvider::new(dimensions),
                )))
            } else {
                Ok(Arc::new(remote))
            }
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: hashing, ollama",
            settings.provider
        ))),
    }
}
