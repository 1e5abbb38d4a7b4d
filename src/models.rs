//! Domain types shared by the loader, chunker, index and pipeline.

use serde::Deserialize;
use serde::Serialize;

/// Text extracted from one PDF page.
///
/// `number` is 1-indexed and follows document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

impl PageText {
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// Where a passage came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageMetadata {
    /// Source page (1-indexed); `None` when the page is unknown
    pub page: Option<u32>,
    /// SHA-256 hex digest of the source document
    pub source_id: String,
    /// Character offset of the passage within its page text
    pub start_index: usize,
    /// Position of the passage in the document's chunk sequence
    pub chunk_index: usize,
}

/// A bounded span of document text; the unit of retrieval.
///
/// `text` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    pub metadata: PassageMetadata,
}

impl Passage {
    #[must_use]
    pub const fn page(&self) -> Option<u32> {
        self.metadata.page
    }
}

/// Answer to one question together with the passages it was conditioned on.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub answer: String,
    /// Retrieved passages, most similar first
    pub sources: Vec<Passage>,
}

impl QueryResult {
    /// Caller-facing view of the sources
    #[must_use]
    pub fn source_refs(&self) -> Vec<SourceRef> {
        self.sources
            .iter()
            .map(|p| SourceRef {
                text: p.text.clone(),
                page: p.page(),
            })
            .collect()
    }

    #[must_use]
    pub fn to_response(&self) -> AnswerResponse {
        AnswerResponse {
            answer: self.answer.clone(),
            sources: self.source_refs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub text: String,
    pub page: Option<u32>,
}

/// Serializable answer payload: `{answer, sources: [{text, page}]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
    pub sources: Vec<SourceRef>,
}
