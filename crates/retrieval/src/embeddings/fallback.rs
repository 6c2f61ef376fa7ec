//! Degrade to local hashing embeddings when the primary provider fails.

use super::providers::hashing::HashingProvider;
use super::EmbeddingProvider;
use async_trait::async_trait;
use lectern_core::AppResult;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug)]
pub struct FallbackProvider {
    primary: Arc<dyn EmbeddingProvider>,
    fallback: HashingProvider,
    name: String,
}

impl FallbackProvider {
    pub fn new(primary: Arc<dyn EmbeddingProvider>, fallback: HashingProvider) -> Self {
        let name = format!("{}+{}", primary.provider_name(), fallback.provider_name());
        Self {
            primary,
            fallback,
            name,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for FallbackProvider {
    fn provider_name(&self) -> &str {
        &self.name
    }

    fn model_name(&self) -> &str {
        self.primary.model_name()
    }

    fn dimensions(&self) -> usize {
        self.primary.dimensions()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        match self.primary.embed_batch(texts).await {
            Ok(embeddings) => Ok(embeddings),
            Err(e) => {
                warn!(
                    provider = self.primary.provider_name(),
                    error = %e,
                    "Embedding provider failed, using hashing embeddings"
                );
                self.fallback.embed_batch(texts).await
            }
        }
    }
}
