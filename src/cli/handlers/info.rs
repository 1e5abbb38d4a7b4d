use crate::cli::output::print_config;
use crate::config::AppConfig;
use crate::errors::Result;

/// Show the effective configuration
pub fn handle_config(config: &AppConfig) -> Result<()> {
    print_config(config);
    Ok(())
}
