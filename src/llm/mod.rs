//! Answer synthesis with a chat language model

pub mod client;
pub mod prompts;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

pub use client::LlmService;
pub use prompts::PromptTemplate;
pub use prompts::RagPrompts;

use crate::errors::Result;
use crate::models::Passage;

/// Produces a natural-language answer from a question and retrieved passages.
///
/// Implementations make a single attempt; failures surface as
/// `ChatPdfError::Synthesis`.
#[async_trait]
pub trait AnswerSynthesizer: Send + Sync {
    async fn answer(&self, question: &str, context: &[Passage]) -> Result<String>;
}

/// One message of a chat completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}
