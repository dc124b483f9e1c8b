//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use imune_core::config::AppConfig;
use imune_core::error::AppError;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Validate configuration file
    Validate,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    config_path: &str,
    mut config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            config.backend.api_key = mask_secret(&config.backend.api_key);
            output::print_item(&config, format);
        }
        ConfigCommand::Validate => {
            config.backend.validate()?;
            output::print_success(&format!("Configuration '{}' is valid", config_path));
            output::print_kv("Provider", &format!("{:?}", config.backend.provider).to_lowercase());
            output::print_kv("URL", &config.backend.url);
            output::print_kv("API key", &mask_secret(&config.backend.api_key));
            output::print_kv("Table", &config.backend.table);
            output::print_kv("Hierarchy function", &config.backend.hierarchy_function);
            output::print_kv("Log level", &config.logging.level);
        }
    }

    Ok(())
}

/// Keep the first four characters of a secret.
fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let visible: String = secret.chars().take(4).collect();
    format!("{}****", visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "");
        assert_eq!(mask_secret("eyJhbGciOi"), "eyJh****");
        assert_eq!(mask_secret("ab"), "ab****");
    }
}
