//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "chatpdf")]
#[command(about = "Ask questions about a PDF document")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a single question about a PDF
    Ask {
        /// PDF document to read
        pdf: PathBuf,
        /// Question to answer
        question: String,
        /// Number of passages used as context
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        /// Print the answer and sources as JSON
        #[arg(long)]
        json: bool,
    },
    /// Chat with a PDF interactively
    Chat {
        /// PDF document to read
        pdf: PathBuf,
        /// Number of passages used as context
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },
    /// Ingest a PDF and list its passages
    Inspect {
        /// PDF document to read
        pdf: PathBuf,
        /// Maximum number of passages to print
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show current configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let cli = Cli::parse_from([
            "chatpdf",
            "ask",
            "report.pdf",
            "What is the capital of France?",
            "--top-k",
            "5",
            "--json",
        ]);

        match cli.command {
            Commands::Ask {
                pdf,
                question,
                top_k,
                json,
            } => {
                assert_eq!(pdf, PathBuf::from("report.pdf"));
                assert_eq!(question, "What is the capital of France?");
                assert_eq!(top_k, Some(5));
                assert!(json);
            }
            _ => panic!("expected ask command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["chatpdf", "inspect", "a.pdf", "-v", "--config", "c.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(cli.command, Commands::Inspect { limit: 20, .. }));
    }

    #[test]
    fn test_command_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
