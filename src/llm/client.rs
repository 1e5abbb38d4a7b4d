//! Chat completion client for `OpenAI` and Ollama

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use super::AnswerSynthesizer;
use super::ChatMessage;
use super::RagPrompts;
use crate::config::AppConfig;
use crate::config::ProviderKind;
use crate::errors::ChatPdfError;
use crate::errors::Result;
use crate::models::Passage;
use crate::rag::ContextAssembler;

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: usize,
}

#[derive(Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: ChatMessage,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: usize,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
}

/// Language model service used to synthesize answers
pub struct LlmService {
    provider: ProviderKind,
    model: String,
    endpoint: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: usize,
    client: Client,
    context_assembler: ContextAssembler,
}

impl LlmService {
    /// Create the service from application configuration
    ///
    /// # Errors
    /// - Missing credential for an `OpenAI` provider
    /// - HTTP client build errors
    pub fn new(config: &AppConfig) -> Result<Self> {
        let provider = config.llm.provider;
        let api_key = config.llm_api_key();

        if provider.requires_api_key() && api_key.is_none() {
            return Err(ChatPdfError::Config(format!(
                "{} is not set. Add it to the environment or a .env file.",
                crate::config::API_KEY_ENV
            )));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.llm.timeout_secs))
            .build()
            .map_err(|e| ChatPdfError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            provider,
            model: config.llm.model.clone(),
            endpoint: config.llm.endpoint.trim_end_matches('/').to_string(),
            api_key,
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
            client,
            context_assembler: ContextAssembler::default(),
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one chat completion with the configured sampling parameters
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        self.chat_with_params(messages, self.temperature, self.max_tokens)
            .await
    }

    /// Run one chat completion
    ///
    /// # Errors
    /// - API request failures (network errors, timeouts, authentication failures)
    /// - Error status codes (rate limits, quota exceeded, unknown model)
    /// - Responses without any answer text
    pub async fn chat_with_params(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: usize,
    ) -> Result<String> {
        match self.provider {
            ProviderKind::OpenAI => self.chat_openai(messages, temperature, max_tokens).await,
            ProviderKind::Ollama => self.chat_ollama(messages, temperature, max_tokens).await,
        }
    }

    async fn chat_openai(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: usize,
    ) -> Result<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ChatPdfError::Config("OpenAI API key not provided".to_string()))?;

        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Calling OpenAI chat completions API: {} ({})", url, self.model);

        let request = OpenAIChatRequest {
            model: &self.model,
            messages,
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatPdfError::Synthesis(format!("Request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ChatPdfError::Synthesis(format!(
                "OpenAI API error ({status}): {error_text}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ChatPdfError::Synthesis(format!("Failed to read response: {e}")))?;

        decode_openai_answer(&body)
    }

    async fn chat_ollama(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: usize,
    ) -> Result<String> {
        let url = format!("{}/api/chat", self.endpoint);
        debug!("Calling Ollama chat API: {} ({})", url, self.model);

        let request = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature,
                num_predict: max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatPdfError::Synthesis(format!("Request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ChatPdfError::Synthesis(format!(
                "Ollama API error ({status}): {error_text}"
            )));
        }

        let result: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| ChatPdfError::Synthesis(format!("Failed to parse response: {e}")))?;

        non_empty_answer(result.message.content)
    }
}

#[async_trait]
impl AnswerSynthesizer for LlmService {
    async fn answer(&self, question: &str, context: &[Passage]) -> Result<String> {
        let context = self.context_assembler.assemble(context);
        let messages = RagPrompts::qa_messages(question, &context);

        info!(
            "Synthesizing answer with {} ({} context chars)",
            self.model,
            context.len()
        );
        self.chat(&messages).await
    }
}

fn decode_openai_answer(body: &str) -> Result<String> {
    let result: OpenAIChatResponse = serde_json::from_str(body)
        .map_err(|e| ChatPdfError::Synthesis(format!("Failed to parse response: {e}")))?;

    let content = result
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| ChatPdfError::Synthesis("No choices in response".to_string()))?;

    non_empty_answer(content)
}

fn non_empty_answer(content: String) -> Result<String> {
    if content.trim().is_empty() {
        return Err(ChatPdfError::Synthesis(
            "Model returned an empty answer".to_string(),
        ));
    }
    Ok(content.trim().to_string())
}
