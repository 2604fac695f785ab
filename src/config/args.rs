//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// qrshorten - URL shortener with QR codes
#[derive(Parser, Debug)]
#[command(name = "qrshorten")]
#[command(version)]
#[command(about = "URL shortener with QR codes and click accounting", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Print a sample configuration file
    GenerateConfig {
        /// Write to this path instead of stdout
        output_path: Option<String>,
    },
}

impl Cli {
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli::parse_from(["qrshorten"]);
        assert_eq!(cli.command_or_default(), Commands::Serve);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_config_flag_and_subcommand() {
        let cli = Cli::parse_from(["qrshorten", "-c", "custom.toml", "generate-config"]);
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
        assert_eq!(
            cli.command_or_default(),
            Commands::GenerateConfig { output_path: None }
        );
    }

    #[test]
    fn test_config_flag_after_subcommand() {
        let cli = Cli::parse_from(["qrshorten", "serve", "--config=prod.toml"]);
        assert_eq!(cli.config.as_deref(), Some("prod.toml"));
    }
}
