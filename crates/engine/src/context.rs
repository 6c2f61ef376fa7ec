//! Process-wide application state, built once at startup.

use crate::answer::AnswerService;
use crate::generator::Generator;
use lectern_core::{AppConfig, AppResult};
use lectern_llm::{create_client, LlmClient};
use lectern_prompt::PromptLibrary;
use lectern_retrieval::{create_provider, EmbeddingProvider, SearchService, VectorIndex};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Everything a request handler needs. Cheap to clone.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub search: Arc<SearchService>,
    pub generator: Generator,
    pub answers: AnswerService,
    started: Instant,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub ready: bool,
    pub image_count: usize,
    pub embedding_count: usize,
    pub dropped_missing: usize,
    pub dimension: usize,
    pub cache_size: usize,
    pub max_cache_size: usize,
    pub embedding_provider: String,
    pub generation_provider: String,
    pub uptime_secs: u64,
}

impl AppContext {
    /// Load the index and wire up providers.
    ///
    /// Fails when the artifacts cannot be loaded; the process must not
    /// serve requests in that case.
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        let index = VectorIndex::load(&config.embeddings_path(), &config.image_paths_file(), |raw| {
            config.resolve_image_path(raw)
        })?;

        let embedder = create_provider(&config.embedding, index.dimension(), config.request_timeout())?;

        let api_key = config.resolve_api_key();
        let endpoint = config.provider_endpoint();
        let client = create_client(
            &config.provider,
            endpoint.as_deref(),
            api_key.as_deref(),
            config.request_timeout(),
        )?;

        let prompts = PromptLibrary::load(&config.prompts_dir())?
            .with_persona(&config.prompts.assistant_name, &config.prompts.language);

        info!(
            documents = index.len(),
            embedding_provider = embedder.provider_name(),
            generation_provider = client.provider_name(),
            model = %config.model,
            "Application context ready"
        );

        Ok(Self::from_parts(config, index, embedder, client, prompts))
    }

    /// Assemble a context from already-built parts.
    pub fn from_parts(
        config: AppConfig,
        index: VectorIndex,
        embedder: Arc<dyn EmbeddingProvider>,
        client: Arc<dyn LlmClient>,
        prompts: PromptLibrary,
    ) -> Self {
        let search = Arc::new(SearchService::new(
            Arc::new(index),
            embedder,
            config.search.cache_size,
        ));
        let generator = Generator::new(client, config.model.clone(), Arc::new(prompts));

        Self {
            config: Arc::new(config),
            search,
            answers: AnswerService::new(generator.clone()),
            generator,
            started: Instant::now(),
        }
    }

    pub fn health(&self) -> HealthReport {
        let index = self.search.index();
        let (cache_size, max_cache_size) = self.search.cache_usage();
        let ready = self.search.is_ready();

        HealthReport {
            status: if ready { "healthy" } else { "not ready" },
            ready,
            image_count: index.image_paths().len(),
            embedding_count: index.embeddings().len(),
            dropped_missing: index.stats().dropped_missing,
            dimension: index.dimension(),
            cache_size,
            max_cache_size,
            embedding_provider: self.search.embedder().provider_name().to_string(),
            generation_provider: self.generator.provider_name().to_string(),
            uptime_secs: self.started.elapsed().as_secs(),
        }
    }
}
