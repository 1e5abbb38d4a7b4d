use std::path::Path;

use tracing::info;

use super::build_pipeline;
use super::ingest_with_progress;
use crate::cli::output::print_answer;
use crate::cli::output::print_info;
use crate::cli::output::Spinner;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::rag::Session;

/// Answer one question about `pdf`
pub async fn handle_ask(
    config: &AppConfig,
    pdf: &Path,
    question: &str,
    top_k: Option<usize>,
    json: bool,
) -> Result<()> {
    let pipeline = build_pipeline(config, top_k)?;
    let mut session = Session::new();

    if json {
        // Keep stdout parseable: no spinner or banners
        pipeline.ingest(&mut session, pdf).await?;
        let result = pipeline.ask(&session, question).await?;
        println!("{}", serde_json::to_string_pretty(&result.to_response())?);
        return Ok(());
    }

    let passages = ingest_with_progress(&pipeline, &mut session, pdf).await?;
    print_info(&format!(
        "Loaded {} ({} passages)",
        session.document_name().unwrap_or_default(),
        passages
    ));

    let mut spinner = Spinner::new("Thinking");
    spinner.start();
    let result = pipeline.ask(&session, question).await;
    spinner.stop();
    let result = result?;

    info!("Answered with {} sources", result.sources.len());
    print_answer(&result, true);
    Ok(())
}
