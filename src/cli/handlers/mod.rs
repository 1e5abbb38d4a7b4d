//! CLI command handlers module
//!
//! This module is organized by functional domains:
//! - ask: one-shot questions
//! - chat: interactive question loop
//! - inspect: passage listing without answer synthesis
//! - info: configuration display

pub mod ask;
pub mod chat;
pub mod info;
pub mod inspect;

// Re-export all public handlers
pub use ask::*;
pub use chat::*;
pub use info::*;
pub use inspect::*;

use std::path::Path;

use crate::cli::output::Spinner;
use crate::config::AppConfig;
use crate::errors::ChatPdfError;
use crate::errors::Result;
use crate::rag::RagPipeline;
use crate::rag::Session;

/// Build a pipeline honouring a command-line `--top-k` override
pub(crate) fn build_pipeline(config: &AppConfig, top_k: Option<usize>) -> Result<RagPipeline> {
    if top_k == Some(0) {
        return Err(ChatPdfError::Config("--top-k must be at least 1".to_string()));
    }
    let pipeline = RagPipeline::new(config)?;
    Ok(match top_k {
        Some(k) => pipeline.with_top_k(k),
        None => pipeline,
    })
}

/// Ingest `pdf` into `session` behind a spinner, reporting the passage count
pub(crate) async fn ingest_with_progress(
    pipeline: &RagPipeline,
    session: &mut Session,
    pdf: &Path,
) -> Result<usize> {
    let mut spinner = Spinner::new("Reading document");
    spinner.start();
    let result = pipeline.ingest(session, pdf).await.map(|index| index.len());
    spinner.stop();
    result
}
