use std::io::BufRead;
use std::io::{self};
use std::path::Path;
use std::path::PathBuf;

use super::build_pipeline;
use super::ingest_with_progress;
use crate::cli::output::print_answer;
use crate::cli::output::print_error;
use crate::cli::output::print_info;
use crate::cli::output::print_prompt;
use crate::cli::output::print_success;
use crate::cli::output::print_warning;
use crate::cli::output::Spinner;
use crate::config::AppConfig;
use crate::document::document_digest;
use crate::errors::Result;
use crate::rag::RagPipeline;
use crate::rag::Session;

/// One line of chat input
#[derive(Debug, PartialEq, Eq)]
enum ChatInput {
    Empty,
    Quit,
    ToggleSources,
    Load(PathBuf),
    /// `:load` without a path, or an unknown `:` command
    Invalid(String),
    Question(String),
}

fn parse_input(line: &str) -> ChatInput {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    let Some(command) = line.strip_prefix(':') else {
        return ChatInput::Question(line.to_string());
    };

    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, arg)| (name, arg.trim()));

    match name {
        "q" | "quit" | "exit" => ChatInput::Quit,
        "sources" => ChatInput::ToggleSources,
        "load" if !arg.is_empty() => ChatInput::Load(PathBuf::from(arg)),
        "load" => ChatInput::Invalid("usage: :load <PDF>".to_string()),
        other => ChatInput::Invalid(format!("unknown command :{other}")),
    }
}

/// Interactive question loop over `pdf`
pub async fn handle_chat(config: &AppConfig, pdf: &Path, top_k: Option<usize>) -> Result<()> {
    let pipeline = build_pipeline(config, top_k)?;
    let mut session = Session::new();

    println!("╔════════════════════════════════════════════════════════════════╗");
    println!("║  💬 Interactive Chat Mode                                     ║");
    println!("║  Commands: ':load <PDF>', ':sources', ':quit', Ctrl+D         ║");
    println!("╚════════════════════════════════════════════════════════════════╝");
    println!();

    load_document(&pipeline, &mut session, pdf).await;

    let mut show_sources = true;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print_prompt("You: ");
        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line?;

        match parse_input(&line) {
            ChatInput::Empty => continue,
            ChatInput::Quit => {
                print_success("👋 Goodbye!");
                break;
            }
            ChatInput::ToggleSources => {
                show_sources = !show_sources;
                print_info(&format!(
                    "Source display {}",
                    if show_sources { "on" } else { "off" }
                ));
            }
            ChatInput::Load(path) => load_document(&pipeline, &mut session, &path).await,
            ChatInput::Invalid(message) => print_warning(&message),
            ChatInput::Question(question) => {
                let mut spinner = Spinner::new("Thinking");
                spinner.start();
                let result = pipeline.ask(&session, &question).await;
                spinner.stop();

                match result {
                    Ok(result) => print_answer(&result, show_sources),
                    Err(e) => print_error(&e.to_string()),
                }
            }
        }
    }

    Ok(())
}

/// Ingest a document, reporting failures without leaving the loop
async fn load_document(pipeline: &RagPipeline, session: &mut Session, pdf: &Path) {
    // Skip re-embedding an unchanged file
    if let Ok(bytes) = std::fs::read(pdf) {
        if session.is_loaded(&document_digest(&bytes)) {
            print_info(&format!("{} is already loaded", pdf.display()));
            println!();
            return;
        }
    }

    match ingest_with_progress(pipeline, session, pdf).await {
        Ok(passages) => print_success(&format!(
            "Loaded {} ({} passages). Ask away!",
            session.document_name().unwrap_or_default(),
            passages
        )),
        Err(e) => {
            print_error(&e.to_string());
            if let Some(name) = session.document_name() {
                print_info(&format!("Still using {name}"));
            }
        }
    }
    println!();
}
