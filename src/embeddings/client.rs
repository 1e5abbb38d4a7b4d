//! Embedding API clients for `OpenAI` and Ollama

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::normalize_for_embedding;
use super::EmbeddingConfig;
use super::EmbeddingProvider;
use crate::config::AppConfig;
use crate::config::ProviderKind;
use crate::errors::ChatPdfError;
use crate::errors::Result;

#[derive(Serialize)]
struct OpenAIBatchRequest<'a> {
    input: Vec<&'a str>,
    model: &'a str,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaResponse {
    embedding: Vec<f32>,
}

/// HTTP client for generating embeddings
pub struct EmbeddingClient {
    config: EmbeddingConfig,
    client: Client,
}

impl EmbeddingClient {
    /// Create a new embedding client
    ///
    /// # Errors
    /// - Missing credential for an `OpenAI` provider
    /// - HTTP client build errors
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        if config.provider.requires_api_key() && config.api_key.is_none() {
            return Err(ChatPdfError::Config(
                "OpenAI API key not provided".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChatPdfError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        Self::new(EmbeddingConfig::from_app_config(config)?)
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Generate embeddings for multiple texts, `batch_size` texts per request
    ///
    /// # Errors
    /// - API request failures (network errors, timeouts, authentication failures)
    /// - Invalid API responses (malformed JSON, missing or extra embeddings)
    pub async fn generate_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let prepared: Vec<String> = texts.iter().map(|t| normalize_for_embedding(t)).collect();
        let mut embeddings = Vec::with_capacity(prepared.len());

        for batch in prepared.chunks(self.config.batch_size) {
            let batch: Vec<&str> = batch.iter().map(String::as_str).collect();
            let vectors = match self.config.provider {
                ProviderKind::OpenAI => self.generate_batch_openai(batch).await?,
                ProviderKind::Ollama => {
                    // Ollama embeds one prompt per request
                    let mut vectors = Vec::with_capacity(batch.len());
                    for text in batch {
                        vectors.push(self.generate_ollama(text).await?);
                    }
                    vectors
                }
            };
            embeddings.extend(vectors);
        }

        Ok(embeddings)
    }

    /// Generate embeddings in batch using `OpenAI` API
    async fn generate_batch_openai(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| ChatPdfError::Config("OpenAI API key not provided".to_string()))?;

        let url = format!("{}/embeddings", self.config.endpoint);
        let expected = texts.len();
        debug!("Calling OpenAI batch embeddings API: {} items", expected);

        let request = OpenAIBatchRequest {
            input: texts,
            model: &self.config.model,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatPdfError::Provider(format!("Request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ChatPdfError::Provider(format!(
                "OpenAI API error ({status}): {error_text}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ChatPdfError::Provider(format!("Failed to read response: {e}")))?;

        decode_openai_embeddings(&body, expected)
    }

    /// Generate embedding using Ollama API
    async fn generate_ollama(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.config.endpoint);
        debug!("Calling Ollama embeddings API: {}", url);

        let request = OllamaRequest {
            model: &self.config.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatPdfError::Provider(format!("Request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ChatPdfError::Provider(format!(
                "Ollama API error ({status}): {error_text}"
            )));
        }

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| ChatPdfError::Provider(format!("Failed to parse response: {e}")))?;

        Ok(result.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for EmbeddingClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.generate_batch(texts).await
    }
}

/// Decode an `OpenAI` embeddings response, restoring input order
fn decode_openai_embeddings(body: &str, expected: usize) -> Result<Vec<Vec<f32>>> {
    let mut result: OpenAIResponse = serde_json::from_str(body)
        .map_err(|e| ChatPdfError::Provider(format!("Failed to parse response: {e}")))?;

    if result.data.len() != expected {
        return Err(ChatPdfError::Provider(format!(
            "Expected {expected} embeddings, received {}",
            result.data.len()
        )));
    }

    result.data.sort_by_key(|d| d.index);
    Ok(result.data.into_iter().map(|d| d.embedding).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_decode_restores_input_order() {
        let body = r#"{
            "object": "list",
            "data": [
                {"object": "embedding", "index": 1, "embedding": [0.0, 1.0]},
                {"object": "embedding", "index": 0, "embedding": [1.0, 0.0]}
            ],
            "model": "text-embedding-ada-002"
        }"#;

        let vectors = decode_openai_embeddings(body, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_decode_rejects_count_mismatch() {
        let body = r#"{"data": [{"index": 0, "embedding": [1.0]}]}"#;
        let err = decode_openai_embeddings(body, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Provider);
    }

    #[test]
    fn test_decode_rejects_malformed_body() {
        let err = decode_openai_embeddings("<html>bad gateway</html>", 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Provider);
    }

    #[test]
    fn test_client_without_key_is_config_error() {
        let err = EmbeddingClient::new(EmbeddingConfig {
            provider: ProviderKind::OpenAI,
            model: "text-embedding-ada-002".to_string(),
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: None,
            batch_size: 100,
            timeout_secs: 120,
        })
        .err()
        .unwrap();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[tokio::test]
    #[ignore = "Requires API key"]
    async fn test_openai_embedding() {
        let client = EmbeddingClient::new(EmbeddingConfig {
            provider: ProviderKind::OpenAI,
            model: "text-embedding-ada-002".to_string(),
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            batch_size: 100,
            timeout_secs: 120,
        })
        .unwrap();

        let embedding = client.embed_one("Hello, world!").await.unwrap();
        assert_eq!(embedding.len(), 1536);
    }
}
