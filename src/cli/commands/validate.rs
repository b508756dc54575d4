//! Validate config command implementation
//!
//! This module implements the `validate-config` command. Every problem in the
//! `[export]` section is reported at once.

use crate::config::{load_config, validate};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        match validate(&config.export) {
            Ok(request) => {
                println!("✅ Export request is valid");
                println!();
                println!("Configuration Summary:");
                println!("  Log Level: {}", config.application.log_level);
                println!(
                    "  Region: {}",
                    config.access.region.as_deref().unwrap_or("(from environment)")
                );
                if let Some(endpoint) = &config.access.custom_endpoint_ec2 {
                    println!("  EC2 Endpoint: {endpoint}");
                }
                println!("  Image: {}", request.image_id());
                println!("  Format: {}", request.disk_image_format());
                println!("  Bucket: {}", request.destination().bucket);
                if let Some(prefix) = &request.destination().prefix {
                    println!("  Prefix: {prefix}");
                }
                println!("  Role: {}", request.role_name());
                println!(
                    "  Polling: every {}s (max {}s, x{}), {} attempts",
                    config.polling.delay_seconds,
                    config.polling.max_delay_seconds,
                    config.polling.backoff_multiplier,
                    if config.polling.max_attempts == 0 {
                        "unbounded".to_string()
                    } else {
                        config.polling.max_attempts.to_string()
                    }
                );
                println!();
                Ok(0)
            }
            Err(errors) => {
                println!("❌ Export request validation failed ({} errors)", errors.len());
                for error in &errors {
                    println!("   - {error}");
                }
                println!();
                Ok(2) // Configuration error exit code
            }
        }
    }
}
