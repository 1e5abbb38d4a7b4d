use chatpdf::cli::Cli;
use chatpdf::cli::Commands;
use chatpdf::config::AppConfig;
use chatpdf::Result;
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load_from(cli.config.as_deref())?;

    // Initialize logging
    if cli.verbose {
        chatpdf::logging::init_logging_with_level("debug")?;
    } else {
        chatpdf::logging::init_logging_with_config(&config)?;
    }
    info!("Configuration loaded successfully");

    // Execute the requested command
    match cli.command {
        Commands::Ask {
            pdf,
            question,
            top_k,
            json,
        } => chatpdf::cli::handle_ask(&config, &pdf, &question, top_k, json).await,
        Commands::Chat { pdf, top_k } => chatpdf::cli::handle_chat(&config, &pdf, top_k).await,
        Commands::Inspect { pdf, limit } => {
            chatpdf::cli::handle_inspect(&config, &pdf, limit).await
        }
        Commands::Config => chatpdf::cli::handle_config(&config),
    }
}
