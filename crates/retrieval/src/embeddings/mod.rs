//! Query embedding.
//!
//! Index vectors are precomputed offline; at query time only the question
//! is embedded, with a provider whose dimensionality matches the index.

pub mod fallback;
pub mod provider;
pub mod providers;

pub use fallback::FallbackProvider;
pub use provider::{create_provider, EmbeddingProvider};
pub use providers::{HashingProvider, OllamaEmbeddingProvider};
