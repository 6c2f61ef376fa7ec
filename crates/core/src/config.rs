//! Configuration management for Lectern.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Defaults
//! - Config files (.lectern/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric: artifacts, prompt overrides and the
//! config file are all resolved relative to the workspace root.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Generation providers the workspace knows how to build.
pub const KNOWN_PROVIDERS: [&str; 2] = ["ollama", "gemini"];

/// Embedding strategies the workspace knows how to build.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["hashing", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .lectern/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active generation provider ("ollama" or "gemini")
    pub provider: String,

    /// Generation model identifier
    pub model: String,

    /// API key for the generation provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    pub artifacts: ArtifactsConfig,
    pub embedding: EmbeddingSettings,
    pub search: SearchSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    Gemini {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    pub fn model(&self) -> &str {
        match self {
            ProviderConfig::Gemini { model, .. } | ProviderConfig::Ollama { model, .. } => model,
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ProviderConfig::Gemini { endpoint, .. } => endpoint.as_deref(),
            ProviderConfig::Ollama { endpoint, .. } => Some(endpoint),
        }
    }
}

/// Startup artifact locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactsConfig {
    /// JSON array of document embeddings
    pub embeddings: PathBuf,

    /// Newline-delimited image paths, positionally aligned with `embeddings`
    pub image_paths: PathBuf,

    /// Base directory for relative image paths (defaults to the workspace)
    pub images_root: Option<PathBuf>,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            embeddings: PathBuf::from("pdf_image_embeddings.json"),
            image_paths: PathBuf::from("processed_image_paths.txt"),
            images_root: None,
        }
    }
}

/// Query embedding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingSettings {
    /// "hashing" (local, deterministic) or "ollama"
    pub provider: String,
    pub model: String,
    pub endpoint: String,
    /// Degrade to the hashing embedder when the remote provider fails
    pub fallback: bool,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "hashing".to_string(),
            model: "nomic-embed-text".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            fallback: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSettings {
    pub cache_size: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { cache_size: 1000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    pub bind_addr: String,
    /// Deadline applied to every external provider call
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            request_timeout_secs: 120,
        }
    }
}

/// Values injected into every prompt render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSettings {
    pub assistant_name: String,
    pub language: String,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            assistant_name: "Teaching Assistant".to_string(),
            language: "English".to_string(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    artifacts: Option<PartialArtifacts>,
    embedding: Option<PartialEmbedding>,
    search: Option<PartialSearch>,
    server: Option<PartialServer>,
    prompts: Option<PartialPrompts>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartialArtifacts {
    embeddings: Option<PathBuf>,
    image_paths: Option<PathBuf>,
    images_root: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartialEmbedding {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    fallback: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartialSearch {
    cache_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartialServer {
    bind_addr: Option<String>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartialPrompts {
    assistant_name: Option<String>,
    language: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            artifacts: ArtifactsConfig::default(),
            embedding: EmbeddingSettings::default(),
            search: SearchSettings::default(),
            server: ServerSettings::default(),
            prompts: PromptSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and environment variables.
    ///
    /// Environment variables:
    /// - `LECTERN_WORKSPACE`: Override workspace path
    /// - `LECTERN_CONFIG`: Path to config file
    /// - `LECTERN_EMBEDDINGS`, `LECTERN_IMAGE_PATHS`, `LECTERN_IMAGES_ROOT`: Artifacts
    /// - `LECTERN_PROVIDER`: Generation provider
    /// - `LECTERN_MODEL`: Model identifier
    /// - `LECTERN_API_KEY`: API key
    /// - `LECTERN_EMBEDDING_PROVIDER`, `LECTERN_EMBEDDING_MODEL`, `LECTERN_EMBEDDING_ENDPOINT`
    /// - `LECTERN_CACHE_SIZE`: Query cache capacity
    /// - `LECTERN_BIND_ADDR`, `LECTERN_REQUEST_TIMEOUT_SECS`: Server settings
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use lectern_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Like [`AppConfig::load`], but an explicit workspace or config file
    /// (from command-line flags) decides which YAML file is read.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        let workspace =
            workspace.or_else(|| std::env::var_os("LECTERN_WORKSPACE").map(PathBuf::from));
        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var_os("LECTERN_CONFIG").map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.lectern_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        config.apply_env()?;

        Ok(config)
    }

    /// Environment variables override YAML config.
    fn apply_env(&mut self) -> AppResult<()> {
        if let Ok(path) = std::env::var("LECTERN_EMBEDDINGS") {
            self.artifacts.embeddings = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("LECTERN_IMAGE_PATHS") {
            self.artifacts.image_paths = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("LECTERN_IMAGES_ROOT") {
            self.artifacts.images_root = Some(PathBuf::from(path));
        }

        if let Ok(provider) = std::env::var("LECTERN_PROVIDER") {
            self.provider = provider;
        }
        if let Ok(model) = std::env::var("LECTERN_MODEL") {
            self.model = model;
        }
        if let Ok(key) = std::env::var("LECTERN_API_KEY") {
            self.api_key = Some(key);
        }

        if let Ok(provider) = std::env::var("LECTERN_EMBEDDING_PROVIDER") {
            self.embedding.provider = provider;
        }
        if let Ok(model) = std::env::var("LECTERN_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Ok(endpoint) = std::env::var("LECTERN_EMBEDDING_ENDPOINT") {
            self.embedding.endpoint = endpoint;
        }

        if let Ok(size) = std::env::var("LECTERN_CACHE_SIZE") {
            self.search.cache_size = parse_env_number("LECTERN_CACHE_SIZE", &size)?;
        }
        if let Ok(addr) = std::env::var("LECTERN_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Ok(secs) = std::env::var("LECTERN_REQUEST_TIMEOUT_SECS") {
            self.server.request_timeout_secs =
                parse_env_number("LECTERN_REQUEST_TIMEOUT_SECS", &secs)?;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }
        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }

        Ok(())
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        Ok(self.merge_file(config_file))
    }

    fn merge_file(&self, config_file: ConfigFile) -> Self {
        let mut result = self.clone();

        if let Some(ws) = config_file.workspace {
            if let Some(path) = ws.path {
                result.workspace = PathBuf::from(path);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }

            result.llm = Some(llm);
        }

        if let Some(artifacts) = config_file.artifacts {
            if let Some(p) = artifacts.embeddings {
                result.artifacts.embeddings = p;
            }
            if let Some(p) = artifacts.image_paths {
                result.artifacts.image_paths = p;
            }
            if let Some(p) = artifacts.images_root {
                result.artifacts.images_root = Some(p);
            }
        }

        if let Some(embedding) = config_file.embedding {
            if let Some(v) = embedding.provider {
                result.embedding.provider = v;
            }
            if let Some(v) = embedding.model {
                result.embedding.model = v;
            }
            if let Some(v) = embedding.endpoint {
                result.embedding.endpoint = v;
            }
            if let Some(v) = embedding.fallback {
                result.embedding.fallback = v;
            }
        }

        if let Some(search) = config_file.search {
            if let Some(size) = search.cache_size {
                result.search.cache_size = size;
            }
        }

        if let Some(server) = config_file.server {
            if let Some(addr) = server.bind_addr {
                result.server.bind_addr = addr;
            }
            if let Some(secs) = server.request_timeout_secs {
                result.server.request_timeout_secs = secs;
            }
        }

        if let Some(prompts) = config_file.prompts {
            if let Some(name) = prompts.assistant_name {
                result.prompts.assistant_name = name;
            }
            if let Some(language) = prompts.language {
                result.prompts.language = language;
            }
        }

        result
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and YAML.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .lectern directory.
    pub fn lectern_dir(&self) -> PathBuf {
        self.workspace.join(".lectern")
    }

    /// Directory holding per-workspace prompt overrides.
    pub fn prompts_dir(&self) -> PathBuf {
        self.lectern_dir().join("prompts")
    }

    /// Absolute location of the embeddings artifact.
    pub fn embeddings_path(&self) -> PathBuf {
        self.workspace.join(&self.artifacts.embeddings)
    }

    /// Absolute location of the image path list.
    pub fn image_paths_file(&self) -> PathBuf {
        self.workspace.join(&self.artifacts.image_paths)
    }

    /// Resolve one line of the image path list to a filesystem path.
    ///
    /// Absolute paths are used as written; relative ones resolve against
    /// `artifacts.imagesRoot`, falling back to the workspace.
    pub fn resolve_image_path(&self, raw: &str) -> PathBuf {
        let path = Path::new(raw);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match self.artifacts.images_root {
            Some(ref root) => self.workspace.join(root).join(path),
            None => self.workspace.join(path),
        }
    }

    /// Deadline for a single external provider call.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Get a provider configuration by name.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider))
    }

    /// Endpoint configured for the active provider, if any.
    pub fn provider_endpoint(&self) -> Option<String> {
        self.get_provider_config(&self.provider)
            .and_then(|p| p.endpoint())
            .map(str::to_string)
    }

    /// Resolve the API key for the active provider.
    ///
    /// `LECTERN_API_KEY` wins; otherwise the provider's `apiKeyEnv` is read.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        match self.get_provider_config(&self.provider) {
            Some(ProviderConfig::Gemini { api_key_env, .. }) => std::env::var(api_key_env).ok(),
            _ => None,
        }
    }

    /// Validate configuration before any service is built.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.provider == "gemini" && self.resolve_api_key().is_none() {
            return Err(AppError::Config(
                "Provider gemini requires an API key (LECTERN_API_KEY or apiKeyEnv)".to_string(),
            ));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.search.cache_size == 0 {
            return Err(AppError::Config(
                "search.cacheSize must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_env_number<T: std::str::FromStr>(name: &str, value: &str) -> AppResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{} must be a number, got '{}'", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.search.cache_size, 1000);
        assert_eq!(config.embedding.provider, "hashing");
        assert_eq!(config.server.bind_addr, "127.0.0.1:3000");
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_lectern_dir() {
        let config = AppConfig::default();
        assert!(config.lectern_dir().ends_with(".lectern"));
        assert!(config.prompts_dir().ends_with(".lectern/prompts"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            None,
            Some("gemini".to_string()),
            Some("gemini-2.5-pro".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "gemini");
        assert_eq!(overridden.model, "gemini-2.5-pro");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_load_with_reads_explicit_config_file() {
        let workspace = tempfile::TempDir::new().unwrap();
        let custom = workspace.path().join("custom.yaml");
        std::fs::write(&custom, "search:\n  cacheSize: 7\n").unwrap();

        let config =
            AppConfig::load_with(Some(workspace.path().to_path_buf()), Some(custom.clone()))
                .unwrap();

        assert_eq!(config.search.cache_size, 7);
        assert_eq!(config.config_file, Some(custom));
    }

    #[test]
    fn test_load_with_reads_workspace_config() {
        let workspace = tempfile::TempDir::new().unwrap();
        let lectern_dir = workspace.path().join(".lectern");
        std::fs::create_dir_all(&lectern_dir).unwrap();
        std::fs::write(lectern_dir.join("config.yaml"), "search:\n  cacheSize: 5\n").unwrap();

        let config = AppConfig::load_with(Some(workspace.path().to_path_buf()), None).unwrap();

        assert_eq!(config.search.cache_size, 5);
        assert_eq!(config.workspace, workspace.path());
    }

    #[test]
    fn test_load_with_missing_workspace_fails() {
        let result = AppConfig::load_with(Some(PathBuf::from("/nonexistent/lectern-ws")), None);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_merge_yaml_reads_all_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
llm:
  activeProvider: gemini
  providers:
    gemini:
      apiKeyEnv: LECTERN_TEST_GEMINI_KEY
      model: gemini-2.5-pro
    ollama:
      endpoint: http://localhost:11434
      model: llava
artifacts:
  embeddings: data/embeddings.json
  imagePaths: data/paths.txt
  imagesRoot: data/images
embedding:
  provider: ollama
  fallback: false
search:
  cacheSize: 50
server:
  bindAddr: 0.0.0.0:8080
prompts:
  language: Thai
logging:
  level: warn
  color: false
"#
        )
        .unwrap();

        let config = AppConfig::default().merge_yaml(file.path()).unwrap();

        assert_eq!(config.provider, "gemini");
        assert_eq!(config.model, "gemini-2.5-pro");
        assert!(matches!(
            config.get_provider_config("ollama"),
            Some(ProviderConfig::Ollama { .. })
        ));
        assert!(matches!(
            config.get_provider_config("gemini"),
            Some(ProviderConfig::Gemini { .. })
        ));
        assert_eq!(config.artifacts.embeddings, PathBuf::from("data/embeddings.json"));
        assert_eq!(config.embedding.provider, "ollama");
        assert!(!config.embedding.fallback);
        assert_eq!(config.embedding.model, "nomic-embed-text");
        assert_eq!(config.search.cache_size, 50);
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.server.request_timeout_secs, 120);
        assert_eq!(config.prompts.language, "Thai");
        assert_eq!(config.prompts.assistant_name, "Teaching Assistant");
        assert_eq!(config.log_level, Some("warn".to_string()));
        assert!(config.no_color);
    }

    #[test]
    fn test_merge_yaml_rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "search: [unclosed").unwrap();
        let result = AppConfig::default().merge_yaml(file.path());
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_resolve_image_path() {
        let mut config = AppConfig {
            workspace: PathBuf::from("/srv/lectern"),
            ..AppConfig::default()
        };
        assert_eq!(
            config.resolve_image_path("/abs/page.png"),
            PathBuf::from("/abs/page.png")
        );
        assert_eq!(
            config.resolve_image_path("pages/1.png"),
            PathBuf::from("/srv/lectern/pages/1.png")
        );

        config.artifacts.images_root = Some(PathBuf::from("images"));
        assert_eq!(
            config.resolve_image_path("1.png"),
            PathBuf::from("/srv/lectern/images/1.png")
        );
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ollama() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_gemini_requires_key() {
        let mut config = AppConfig::default();
        config.provider = "gemini".to_string();
        assert!(config.validate().is_err());

        config.api_key = Some("secret".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_cache() {
        let mut config = AppConfig::default();
        config.search.cache_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_unknown_embedding_provider() {
        let mut config = AppConfig::default();
        config.embedding.provider = "voyage".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_env_number() {
        assert_eq!(parse_env_number::<usize>("X", " 12 ").unwrap(), 12);
        assert!(parse_env_number::<usize>("X", "many").is_err());
    }
}
