use std::path::Path;

use super::build_pipeline;
use super::ingest_with_progress;
use crate::cli::output::print_passages;
use crate::cli::output::print_success;
use crate::config::AppConfig;
use crate::errors::ChatPdfError;
use crate::errors::Result;
use crate::rag::Session;

/// Ingest `pdf` and print up to `limit` of its passages
pub async fn handle_inspect(config: &AppConfig, pdf: &Path, limit: usize) -> Result<()> {
    let pipeline = build_pipeline(config, None)?;
    let mut session = Session::new();

    let total = ingest_with_progress(&pipeline, &mut session, pdf).await?;
    let index = session.index().ok_or(ChatPdfError::NotReady)?;

    print_success(&format!(
        "Indexed {}: {} passages, {} dimensions, {} distance",
        session.document_name().unwrap_or_default(),
        total,
        index.dimension(),
        index.metric()
    ));
    println!();

    let passages: Vec<_> = index.passages().take(limit).collect();
    print_passages(&passages, total);
    Ok(())
}
