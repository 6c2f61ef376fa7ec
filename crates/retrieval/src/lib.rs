//! Retrieval layer for Lectern.
//!
//! Loads the precomputed image embeddings, embeds incoming questions and
//! ranks document images by cosine similarity. Also hosts the keyword
//! classifier and query expansion used to pick a retrieval strategy.

pub mod cache;
pub mod classify;
pub mod embeddings;
pub mod expand;
pub mod index;
pub mod retry;
pub mod search;
pub mod types;

// Re-export main types
pub use cache::QueryCache;
pub use classify::{classify, Complexity, QuestionAnalysis, Strategy};
pub use embeddings::{create_provider, EmbeddingProvider, HashingProvider};
pub use expand::{expand_query, merge_results};
pub use index::{cosine_similarity, IndexStats, VectorIndex};
pub use retry::{Backoff, RetryPolicy};
pub use search::{SearchService, SIMILARITY_THRESHOLD};
pub use types::{RankedImage, SearchResult};
