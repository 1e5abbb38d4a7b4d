//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `chatpdf` CLI

use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::AppConfig;
use crate::models::Passage;
use crate::models::QueryResult;

/// Safely truncate a string at character boundary (not byte boundary)
///
/// This prevents panics when truncating strings with multi-byte UTF-8 characters (emojis, etc.)
///
/// # Arguments
/// * `s` - The string to truncate
/// * `max_chars` - Maximum number of characters (not bytes)
///
/// # Returns
/// Truncated string with "..." suffix if truncated, otherwise the original string
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Word-wrap `text` to `max_width` characters per line
#[must_use]
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        let current_width = current_line.chars().count();
        if current_width > 0 && current_width + word.chars().count() + 1 > max_width {
            lines.push(std::mem::take(&mut current_line));
        }
        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }
    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}

pub fn print_wrapped(text: &str, max_width: usize) {
    for line in wrap_text(text, max_width) {
        println!("{line}");
    }
}

/// Print an answer followed by its sources
pub fn print_answer(result: &QueryResult, show_sources: bool) {
    println!();
    print_wrapped(&result.answer, 78);
    println!();

    if show_sources {
        print_sources(&result.sources);
    }
}

/// Print retrieved passages with their pages
pub fn print_sources(sources: &[Passage]) {
    if sources.is_empty() {
        return;
    }

    println!("📚 Sources:");
    for (idx, passage) in sources.iter().enumerate() {
        let page = passage
            .page()
            .map_or_else(|| "?".to_string(), |p| p.to_string());
        println!(
            "  {}. [page {}] {}",
            idx + 1,
            page,
            truncate_str(&passage.text.replace('\n', " "), 120)
        );
    }
    println!();
}

/// Print passages produced by ingestion
pub fn print_passages(passages: &[&Passage], total: usize) {
    println!("Showing {} of {} passages:", passages.len(), total);
    for passage in passages {
        let page = passage
            .page()
            .map_or_else(|| "?".to_string(), |p| p.to_string());
        println!();
        println!(
            "  #{} | page {} | offset {} | {} chars",
            passage.metadata.chunk_index,
            page,
            passage.metadata.start_index,
            passage.text.chars().count()
        );
        println!("  {}", truncate_str(&passage.text.replace('\n', " "), 200));
    }
}

/// Print configuration
pub fn print_config(config: &AppConfig) {
    println!("📋 chatpdf Configuration:");
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!("  Directory: {}", config.logging.log_dir);
    println!("  File output: {}", config.logging.file_output);
    println!();

    println!("🧠 Embeddings:");
    println!("  Provider: {:?}", config.embeddings.provider);
    println!("  Model: {}", config.embedding_model());
    println!("  Endpoint: {}", config.embeddings.endpoint);
    println!("  Batch size: {}", config.embeddings.batch_size);
    println!("  Key: {}", mask_key(config.embeddings_api_key().as_deref()));
    println!();

    println!("✂️  Chunking:");
    println!("  Chunk size: {}", config.chunking.chunk_size);
    println!("  Chunk overlap: {}", config.chunking.chunk_overlap);
    println!("  Separators: {:?}", config.chunking.separators);
    println!();

    println!("🔍 Retrieval:");
    println!("  Top k: {}", config.top_k());
    println!("  Metric: {}", config.retrieval.metric);
    println!();

    println!("🤖 LLM:");
    println!("  Provider: {:?}", config.llm.provider);
    println!("  Model: {}", config.llm_model());
    println!("  Endpoint: {}", config.llm.endpoint);
    println!("  Temperature: {}", config.llm.temperature);
    println!("  Max tokens: {}", config.llm.max_tokens);
    println!("  Key: {}", mask_key(config.llm_api_key().as_deref()));
}

/// Mask a credential, keeping only a short prefix
#[must_use]
pub fn mask_key(key: Option<&str>) -> String {
    match key {
        None => "(not set)".to_string(),
        Some(key) if key.chars().count() <= 8 => "***".to_string(),
        Some(key) => format!("{}***", key.chars().take(3).collect::<String>()),
    }
}

/// Print colored output functions
pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("❌ {msg}");
}

pub fn print_prompt(msg: &str) {
    print!("{msg}");
    std::io::stdout().flush().ok();
}

/// Busy indicator drawn on stdout while a slow call is in flight
pub struct Spinner {
    message: String,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn start(&mut self) {
        let message = self.message.clone();
        let running = self.running.clone();
        running.store(true, Ordering::Relaxed);

        self.handle = Some(std::thread::spawn(move || {
            let frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
            let mut idx = 0;

            while running.load(Ordering::Relaxed) {
                print!("\r   {} {}...", frames[idx], message);
                std::io::stdout().flush().ok();
                idx = (idx + 1) % frames.len();
                std::thread::sleep(Duration::from_millis(80));
            }

            // Clear the line
            print!("\r{}\r", " ".repeat(80));
            std::io::stdout().flush().ok();
        }));
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}
