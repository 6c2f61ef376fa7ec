//! Similarity search over the vector index.
//!
//! Flow: readiness check → cache lookup → embed the question (with retry)
//! → cosine score every document → stable sort → top-k → threshold filter
//! → cache store.

use crate::cache::QueryCache;
use crate::embeddings::EmbeddingProvider;
use crate::index::{cosine_similarity, VectorIndex};
use crate::retry::RetryPolicy;
use crate::types::{RankedImage, SearchResult};
use lectern_core::{preview, AppError, AppResult};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Results at or below this similarity are dropped.
pub const SIMILARITY_THRESHOLD: f32 = 0.1;

/// Documents scored per block during a scan.
const SCAN_BLOCK_SIZE: usize = 1000;

pub struct SearchService {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    cache: Mutex<QueryCache>,
    retry: RetryPolicy,
}

impl SearchService {
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        cache_size: usize,
    ) -> Self {
        Self {
            index,
            embedder,
            cache: Mutex::new(QueryCache::new(cache_size)),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn is_ready(&self) -> bool {
        self.index.is_ready()
    }

    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    /// Current number of cached queries and the cache capacity.
    pub fn cache_usage(&self) -> (usize, usize) {
        let cache = self.cache.lock();
        (cache.len(), cache.capacity())
    }

    /// Find the `top_k` documents most similar to `question`.
    ///
    /// Identical `(question, top_k)` pairs are answered from the cache with
    /// the same shared result and no embedding call.
    #[instrument(skip(self, question))]
    pub async fn search(&self, question: &str, top_k: usize) -> AppResult<Arc<SearchResult>> {
        if !self.index.is_ready() {
            return Err(AppError::NotReady(
                "Vector index is not loaded or has no images".to_string(),
            ));
        }

        let key = QueryCache::key(question, top_k);
        let cached = self.cache.lock().get(&key);
        if let Some(hit) = cached {
            debug!(question = %preview(question, 50), "Search cache hit");
            return Ok(hit);
        }

        let start = Instant::now();
        info!(question = %preview(question, 50), top_k, "Searching");

        let embedder = &self.embedder;
        let query = self
            .retry
            .run("embed query", || async move { embedder.embed(question).await })
            .await?;

        let results = self.rank(&query, top_k)?;
        let processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            results = results.len(),
            best = results.first().map(|r| r.similarity).unwrap_or_default(),
            processing_time_ms,
            "Search complete"
        );

        let result = Arc::new(SearchResult {
            question: key.0.clone(),
            results,
            processing_time_ms,
        });

        self.cache.lock().insert(key, Arc::clone(&result));
        Ok(result)
    }

    /// Score, sort, truncate and threshold-filter the index for one query.
    pub fn rank(&self, query: &[f32], top_k: usize) -> AppResult<Vec<RankedImage>> {
        if query.len() != self.index.dimension() {
            return Err(AppError::DimensionMismatch {
                expected: self.index.dimension(),
                actual: query.len(),
            });
        }

        let embeddings = self.index.embeddings();
        let mut scored: Vec<(usize, f32)> = Vec::with_capacity(embeddings.len());

        for (block_no, block) in embeddings.chunks(SCAN_BLOCK_SIZE).enumerate() {
            let offset = block_no * SCAN_BLOCK_SIZE;
            scored.extend(
                block
                    .iter()
                    .enumerate()
                    .map(|(i, doc)| (offset + i, cosine_similarity(query, doc))),
            );
        }

        // Stable: equal scores keep index order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_k.min(scored.len()));

        let best = scored.first().copied();
        let mut kept: Vec<(usize, f32)> = scored
            .into_iter()
            .filter(|(_, similarity)| *similarity > SIMILARITY_THRESHOLD)
            .collect();

        if kept.is_empty() {
            if let Some(best) = best {
                debug!(similarity = best.1, "No result above threshold, keeping best match");
                kept.push(best);
            }
        }

        Ok(kept
            .into_iter()
            .map(|(index, similarity)| RankedImage {
                index,
                similarity,
                image_path: self.index.image_paths()[index].clone(),
            })
            .collect())
    }
}
