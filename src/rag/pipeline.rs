//! Complete RAG pipeline: Load -> Chunk -> Embed -> Index, then Retrieve -> Generate

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;
use tracing::info;

use crate::config::AppConfig;
use crate::document::Chunker;
use crate::document::DocumentLoader;
use crate::document::PdfLoader;
use crate::embeddings::EmbeddingClient;
use crate::embeddings::EmbeddingProvider;
use crate::errors::ChatPdfError;
use crate::errors::Result;
use crate::llm::AnswerSynthesizer;
use crate::llm::LlmService;
use crate::models::QueryResult;
use crate::rag::DistanceMetric;
use crate::rag::Session;
use crate::rag::VectorIndex;

/// Orchestrates ingestion and question answering for one session at a time
pub struct RagPipeline {
    loader: Box<dyn DocumentLoader>,
    chunker: Chunker,
    embedder: Arc<dyn EmbeddingProvider>,
    synthesizer: Arc<dyn AnswerSynthesizer>,
    top_k: usize,
    metric: DistanceMetric,
    /// Where uploads are staged; the system temp dir when unset
    temp_dir: Option<PathBuf>,
}

impl RagPipeline {
    /// Create a pipeline backed by the configured HTTP providers
    ///
    /// # Errors
    /// - Invalid chunking parameters
    /// - Missing credential for an `OpenAI` provider
    pub fn new(config: &AppConfig) -> Result<Self> {
        let chunker = Chunker::new(config.chunking.clone())?;
        let embedder = Arc::new(EmbeddingClient::from_app_config(config)?);
        let synthesizer = Arc::new(LlmService::new(config)?);

        Ok(Self::from_parts(
            Box::new(PdfLoader),
            chunker,
            embedder,
            synthesizer,
        )
        .with_top_k(config.top_k())
        .with_metric(config.retrieval.metric))
    }

    /// Create from existing components
    #[must_use]
    pub fn from_parts(
        loader: Box<dyn DocumentLoader>,
        chunker: Chunker,
        embedder: Arc<dyn EmbeddingProvider>,
        synthesizer: Arc<dyn AnswerSynthesizer>,
    ) -> Self {
        Self {
            loader,
            chunker,
            embedder,
            synthesizer,
            top_k: 3,
            metric: DistanceMetric::default(),
            temp_dir: None,
        }
    }

    /// Number of passages retrieved per question
    #[must_use]
    pub const fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Stage uploaded bytes in `dir` instead of the system temp dir
    #[must_use]
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub const fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    #[must_use]
    pub const fn top_k(&self) -> usize {
        self.top_k
    }

    /// Ingest the PDF at `path`, replacing the session's document on success
    ///
    /// # Errors
    /// - `NotFound` / `Load` for missing or unreadable files
    /// - `EmptyDocument` when no text could be extracted
    /// - `Provider` when embedding fails
    ///
    /// On error the session keeps whatever it held before.
    pub async fn ingest<'s>(
        &self,
        session: &'s mut Session,
        path: &Path,
    ) -> Result<&'s VectorIndex> {
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );
        self.ingest_named(session, path, name).await
    }

    /// Ingest an uploaded PDF held in memory.
    ///
    /// The bytes are written to a temporary `.pdf` file that is removed on
    /// every exit path.
    ///
    /// # Errors
    /// Same as [`RagPipeline::ingest`], plus `Io` when the temporary file
    /// cannot be written.
    pub async fn ingest_bytes<'s>(
        &self,
        session: &'s mut Session,
        name: &str,
        bytes: &[u8],
    ) -> Result<&'s VectorIndex> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("chatpdf-").suffix(".pdf");
        let mut file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(bytes)?;
        file.flush()?;
        debug!("Wrote {} bytes to {}", bytes.len(), file.path().display());

        self.ingest_named(session, file.path(), name.to_string()).await
    }

    async fn ingest_named<'s>(
        &self,
        session: &'s mut Session,
        path: &Path,
        name: String,
    ) -> Result<&'s VectorIndex> {
        info!("Ingesting {}", name);

        debug!("Step 1: Loading pages");
        let document = self.loader.load(path)?;

        debug!("Step 2: Chunking {} pages", document.pages.len());
        let passages = self.chunker.split(&document.pages, &document.source_id);
        if passages.is_empty() {
            return Err(ChatPdfError::EmptyDocument(name));
        }

        debug!("Step 3: Embedding {} passages", passages.len());
        let index = VectorIndex::build(passages, self.embedder.as_ref(), self.metric).await?;

        info!(
            "Ingested {}: {} pages, {} passages",
            name,
            document.pages.len(),
            index.len()
        );
        Ok(session.replace(index, name))
    }

    /// Answer a question about the session's document
    ///
    /// # Errors
    /// - `NotReady` before any successful ingest
    /// - `InvalidQuestion` for blank questions
    /// - `Provider` / `Synthesis` for external service failures
    pub async fn ask(&self, session: &Session, question: &str) -> Result<QueryResult> {
        let index = session.index().ok_or(ChatPdfError::NotReady)?;

        let question = question.trim();
        if question.is_empty() {
            return Err(ChatPdfError::InvalidQuestion(
                "question must not be empty".to_string(),
            ));
        }

        info!("Processing question: {}", question);

        debug!("Step 1: Embedding question");
        let query = self.embedder.embed_one(question).await?;

        debug!("Step 2: Retrieving top {} passages", self.top_k);
        let hits = index.search(&query, self.top_k)?;
        for hit in &hits {
            debug!(
                "  chunk {} (page {:?}) distance {:.4}",
                hit.passage.metadata.chunk_index,
                hit.passage.page(),
                hit.distance
            );
        }
        let sources: Vec<_> = hits.into_iter().map(|hit| hit.passage).collect();

        debug!("Step 3: Generating answer");
        let answer = self.synthesizer.answer(question, &sources).await?;

        info!("Question answered with {} sources", sources.len());
        Ok(QueryResult { answer, sources })
    }
}
