//! Embeddings generation module
//!
//! The pipeline only depends on the [`EmbeddingProvider`] capability. The
//! bundled implementation, [`EmbeddingClient`], talks to:
//! - `OpenAI` (text-embedding-ada-002, text-embedding-3-small, etc.)
//! - Ollama (local models)
//!
//! # Examples
//!
//! ```rust,no_run
//! use chatpdf::config::AppConfig;
//! use chatpdf::embeddings::EmbeddingClient;
//! use chatpdf::embeddings::EmbeddingProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let client = EmbeddingClient::from_app_config(&config)?;
//!
//!     let embedding = client.embed_one("Hello, world!").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;

use async_trait::async_trait;

pub use client::EmbeddingClient;

use crate::config::AppConfig;
use crate::config::ProviderKind;
use crate::errors::ChatPdfError;
use crate::errors::Result;

/// Converts text into fixed-dimension vectors.
///
/// Implementations return exactly one vector per input, in input order, and
/// do not retry on failure.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts
    ///
    /// # Errors
    /// `ChatPdfError::Provider` on network, authentication or quota failures.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| ChatPdfError::Provider("No embedding in response".to_string()))
    }
}

/// Configuration for embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl EmbeddingConfig {
    /// Resolve provider settings and credential
    ///
    /// # Errors
    /// `ChatPdfError::Config` when an `OpenAI` provider has no API key.
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        let provider = config.embeddings.provider;
        let api_key = config.embeddings_api_key();

        if provider.requires_api_key() && api_key.is_none() {
            return Err(ChatPdfError::Config(format!(
                "{} is not set. Add it to the environment or a .env file.",
                crate::config::API_KEY_ENV
            )));
        }

        Ok(Self {
            provider,
            model: config.embeddings.model.clone(),
            endpoint: config.embeddings.endpoint.trim_end_matches('/').to_string(),
            api_key,
            batch_size: config.embeddings.batch_size.max(1),
            timeout_secs: config.embeddings.timeout_secs,
        })
    }
}

/// Collapse line breaks and runs of whitespace into single spaces
#[must_use]
pub fn normalize_for_embedding(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_normalize_for_embedding() {
        assert_eq!(
            normalize_for_embedding("The capital\nof France\r\n\tis  Paris."),
            "The capital of France is Paris."
        );
    }

    #[test]
    fn test_openai_requires_key_at_construction() {
        let mut config = AppConfig::default();
        config.embeddings.api_key = None;
        if std::env::var(crate::config::API_KEY_ENV).is_ok() {
            // The environment supplies a key; nothing to assert here
            return;
        }
        let err = EmbeddingConfig::from_app_config(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let mut config = AppConfig::default();
        config.embeddings.provider = ProviderKind::Ollama;
        config.embeddings.endpoint = "http://localhost:11434/".to_string();

        config.embeddings.timeout_secs = 30;

        let resolved = EmbeddingConfig::from_app_config(&config).unwrap();
        assert_eq!(resolved.endpoint, "http://localhost:11434");
        assert_eq!(resolved.timeout_secs, 30);
    }
}
