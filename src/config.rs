use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::document::ChunkingConfig;
use crate::rag::DistanceMetric;

/// Environment variable holding the API credential for `OpenAI` providers
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Remote service flavour used for embeddings and chat completions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// `OpenAI` compatible API (requires a credential)
    OpenAI,
    /// Ollama local server
    Ollama,
}

impl ProviderKind {
    #[must_use]
    pub const fn requires_api_key(self) -> bool {
        matches!(self, Self::OpenAI)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_true")]
    pub file_output: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Maximum texts per embedding request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Per-request HTTP timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of passages handed to the answer synthesizer
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub metric: DistanceMetric,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_provider() -> ProviderKind {
    ProviderKind::OpenAI
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_llm_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

const fn default_batch_size() -> usize {
    100
}

const fn default_max_tokens() -> usize {
    1024
}

const fn default_timeout_secs() -> u64 {
    120
}

const fn default_top_k() -> usize {
    3
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: default_log_dir(),
            file_output: true,
        }
    }
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_embedding_model(),
            endpoint: default_openai_endpoint(),
            api_key: None,
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_llm_model(),
            endpoint: default_openai_endpoint(),
            api_key: None,
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            metric: DistanceMetric::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default locations
    ///
    /// Tries `config.toml`, then `config.example.toml`, then falls back to
    /// built-in defaults.
    pub fn load() -> crate::Result<Self> {
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            warn!("Using config.example.toml. Create config.toml to customise settings.");
            Self::from_file("config.example.toml")
        } else {
            warn!("No config file found, using built-in defaults");
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Load from an explicit path when one is given, otherwise from the default locations
    pub fn load_from(path: Option<&Path>) -> crate::Result<Self> {
        match path {
            Some(path) if !path.exists() => Err(crate::ChatPdfError::NotFound(path.to_path_buf())),
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Check parameter ranges and endpoint syntax
    ///
    /// # Errors
    /// `ChatPdfError::Config` describing the first invalid setting.
    pub fn validate(&self) -> crate::Result<()> {
        self.chunking.validate()?;

        if self.retrieval.top_k == 0 {
            return Err(crate::ChatPdfError::Config(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(crate::ChatPdfError::Config(format!(
                "llm.temperature must be within 0.0..=2.0, got {}",
                self.llm.temperature
            )));
        }
        if self.embeddings.batch_size == 0 {
            return Err(crate::ChatPdfError::Config(
                "embeddings.batch_size must be at least 1".to_string(),
            ));
        }
        for (name, endpoint) in [
            ("embeddings.endpoint", &self.embeddings.endpoint),
            ("llm.endpoint", &self.llm.endpoint),
        ] {
            url::Url::parse(endpoint).map_err(|e| {
                crate::ChatPdfError::Config(format!("{name} is not a valid URL ({endpoint}): {e}"))
            })?;
        }

        Ok(())
    }

    /// Credential for the embedding provider: config value first, then environment
    #[must_use]
    pub fn embeddings_api_key(&self) -> Option<String> {
        self.embeddings.api_key.clone().or_else(env_api_key)
    }

    /// Credential for the language model: config value first, then environment
    #[must_use]
    pub fn llm_api_key(&self) -> Option<String> {
        self.llm.api_key.clone().or_else(env_api_key)
    }

    /// Get retrieval count
    #[must_use]
    pub const fn top_k(&self) -> usize {
        self.retrieval.top_k
    }

    /// Get LLM model
    #[must_use]
    pub fn llm_model(&self) -> &str {
        &self.llm.model
    }

    /// Get embedding model name
    #[must_use]
    pub fn embedding_model(&self) -> &str {
        &self.embeddings.model
    }
}

fn env_api_key() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|key| !key.trim().is_empty())
}
