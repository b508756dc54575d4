//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for vmexport using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// vmexport - Machine image export tool
#[derive(Parser, Debug)]
#[command(name = "vmexport")]
#[command(version, about, long_about = None)]
#[command(author = "vmexport Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "vmexport.toml", env = "VMEXPORT_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "VMEXPORT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a machine image to object storage
    Export(commands::export::ExportArgs),

    /// Validate configuration file and export request
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from(["vmexport", "export"]);
        assert_eq!(cli.config, "vmexport.toml");
        assert!(matches!(cli.command, Commands::Export(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["vmexport", "--config", "custom.toml", "export"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["vmexport", "--log-level", "debug", "export"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_export_overrides() {
        let cli = Cli::parse_from([
            "vmexport",
            "export",
            "--image-id",
            "ami-1",
            "--format",
            "raw",
            "--timeout",
            "3600",
            "--dry-run",
        ]);
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.image_id.as_deref(), Some("ami-1"));
                assert_eq!(args.format.as_deref(), Some("raw"));
                assert_eq!(args.timeout, Some(3600));
                assert!(args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["vmexport", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["vmexport", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
