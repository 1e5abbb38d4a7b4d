//! Logging configuration for chatpdf

use std::path::Path;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::config::AppConfig;
use crate::Result;

const LOG_FILE_PREFIX: &str = "chatpdf.log";

/// Initialize logging with configuration
pub fn init_logging_with_config(config: &AppConfig) -> Result<()> {
    let level = &config.logging.level;
    let env_filter = EnvFilter::new(format!("{level},chatpdf={level}"));
    let log_dir = config
        .logging
        .file_output
        .then(|| Path::new(&config.logging.log_dir));
    install(env_filter, log_dir, level)
}

/// Initialize logging with custom log level
pub fn init_logging_with_level(level: &str) -> Result<()> {
    let env_filter = EnvFilter::new(format!("{level},chatpdf={level}"));
    install(env_filter, Some(Path::new("logs")), level)
}

fn install(env_filter: EnvFilter, log_dir: Option<&Path>, level: &str) -> Result<()> {
    // Console output goes to stderr so that stdout stays clean for answers and JSON
    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    let Some(log_dir) = log_dir else {
        Registry::default()
            .with(env_filter)
            .with(console_layer)
            .init();
        tracing::info!("Logging initialized with level: {} - console output only", level);
        return Ok(());
    };

    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking)
        .with_ansi(false);

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!("Logging initialized with level: {} - console and file output enabled", level);
    tracing::info!(
        "Log files will be saved to: {}/{}.YYYY-MM-DD",
        log_dir.display(),
        LOG_FILE_PREFIX
    );

    // The writer must outlive every log call, which is the whole process
    std::mem::forget(guard);

    Ok(())
}

/// Initialize simple logging for testing
pub fn init_simple_logging() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();
    Ok(())
}
