//! Hashing embedding provider: a deterministic bag-of-words bucket histogram.

use crate::embeddings::provider::EmbeddingProvider;
use lectern_core::AppResult;

/// Local, offline embedding provider.
///
/// Each whitespace-separated, lowercased token is hashed into one of
/// `dimensions` buckets and counted; the histogram is then L2-normalised.
/// It carries no semantics beyond shared tokens, but identical text always
/// yields an identical vector, so cached results stay valid.
#[derive(Debug)]
pub struct HashingProvider {
    dimensions: usize,
}

impl HashingProvider {
    /// Create a new hashing provider with specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return embedding;
        }

        let lower = text.to_lowercase();
        for token in lower.split_whitespace() {
            let bucket = (token_hash(token).unsigned_abs() as usize) % self.dimensions;
            embedding[bucket] += 1.0;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

/// Polynomial rolling hash (`h * 31 + unit`) over UTF-16 code units,
/// wrapped to a signed 32-bit value.
pub fn token_hash(token: &str) -> i32 {
    token.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(unit as i32)
    })
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashingProvider {
    fn provider_name(&self) -> &str {
        "hashing"
    }

    fn model_name(&self) -> &str {
        "token-hash-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[test]
    fn test_token_hash_known_values() {
        assert_eq!(token_hash(""), 0);
        assert_eq!(token_hash("a"), 97);
        // 97 * 31 + 98
        assert_eq!(token_hash("ab"), 3105);
    }

    #[test]
    fn test_token_hash_wraps() {
        // Long tokens overflow 32 bits and must wrap instead of panicking
        let hash = token_hash("supercalifragilisticexpialidocious");
        assert_eq!(hash, token_hash("supercalifragilisticexpialidocious"));
    }

    #[test]
    fn test_min_hash_maps_to_valid_bucket() {
        let provider = HashingProvider::new(384);
        let bucket = (i32::MIN.unsigned_abs() as usize) % provider.dimensions();
        assert!(bucket < 384);
    }

    #[tokio::test]
    async fn test_hashing_provider_dimensions() {
        let provider = HashingProvider::new(384);
        assert_eq!(provider.dimensions(), 384);
        assert_eq!(provider.provider_name(), "hashing");
    }

    #[tokio::test]
    async fn test_hashing_provider_embed_single() {
        let provider = HashingProvider::new(384);
        let embedding = provider.embed("hello world").await.unwrap();

        assert_eq!(embedding.len(), 384);
        assert!((norm(&embedding) - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_repeated_token_counts() {
        let provider = HashingProvider::new(384);
        let embedding = provider.embed("Echo echo ECHO").await.unwrap();

        let bucket = (token_hash("echo").unsigned_abs() as usize) % 384;
        assert!((embedding[bucket] - 1.0).abs() < 1e-6);
        assert_eq!(embedding.iter().filter(|&&x| x != 0.0).count(), 1);
    }

    #[tokio::test]
    async fn test_hashing_provider_deterministic() {
        let provider = HashingProvider::new(384);
        let text = "สรุปกิจกรรมทั้งหมด activity 2";

        let embedding1 = provider.embed(text).await.unwrap();
        let embedding2 = provider.embed(text).await.unwrap();

        assert_eq!(embedding1, embedding2);
    }

    #[tokio::test]
    async fn test_hashing_provider_different_texts() {
        let provider = HashingProvider::new(384);

        let embedding1 = provider.embed("hello world").await.unwrap();
        let embedding2 = provider.embed("goodbye moon").await.unwrap();

        assert_ne!(embedding1, embedding2);
    }

    #[tokio::test]
    async fn test_hashing_provider_empty_text() {
        let provider = HashingProvider::new(384);
        let embedding = provider.embed("   ").await.unwrap();

        assert_eq!(embedding.len(), 384);
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_hashing_provider_batch() {
        let provider = HashingProvider::new(16);
        let texts = vec!["one".to_string(), "two three".to_string()];

        let embeddings = provider.embed_batch(&texts).await.unwrap();
        assert_eq!(embeddings.len(), 2);
        assert!(embeddings.iter().all(|e| e.len() == 16));
    }
}
