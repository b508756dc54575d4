//! Export command implementation
//!
//! This module implements the `export` command: validate the request,
//! open a session, submit the export task and wait for it to finish.

use crate::adapters::aws::AwsSessionProvider;
use crate::config::{load_config, validate, VmExportConfig};
use crate::core::export::{ExportContext, ExportOrchestrator};
use crate::domain::errors::{CancelReason, ExportError};
use crate::domain::request::ExportRequest;
use crate::logging::{RedactingFilter, SecretFilter};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Exit code for configuration and validation errors
pub const EXIT_CONFIG: i32 = 2;
/// Exit code when no session could be established
pub const EXIT_SESSION: i32 = 4;
/// Exit code for a failed export
pub const EXIT_EXPORT: i32 = 5;
/// Exit code when the wait was cancelled (SIGINT convention)
pub const EXIT_CANCELLED: i32 = 130;
/// Exit code when the wait deadline passed, as `timeout(1)` reports it
pub const EXIT_TIMEOUT: i32 = 124;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Dry run mode - validate and log the request without submitting it
    #[arg(long)]
    pub dry_run: bool,

    /// Override the source image id
    #[arg(long)]
    pub image_id: Option<String>,

    /// Override the disk image format (vmdk, raw, vhd)
    #[arg(long)]
    pub format: Option<String>,

    /// Give up waiting after this many seconds (overrides polling.timeout_seconds)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Print the resulting artifact as JSON
    #[arg(long)]
    pub json: bool,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("{e}");
                return Ok(EXIT_CONFIG);
            }
        };
        self.apply_overrides(&mut config);

        let request = match validate(&config.export) {
            Ok(r) => r,
            Err(errors) => {
                tracing::error!(errors = errors.len(), "Export request is invalid");
                eprintln!("Invalid export configuration: {errors}");
                return Ok(EXIT_CONFIG);
            }
        };

        let filter = Arc::new(RedactingFilter::from_access(&config.access));

        if config.application.dry_run {
            tracing::info!(
                request = %filter.redact(&format!("{request:?}")),
                "Dry run mode enabled - export will not be submitted"
            );
            println!("🔍 DRY RUN MODE - no export task will be submitted");
            println!();
            print_request(&request);
            return Ok(0);
        }

        let provider = AwsSessionProvider::new(config.access.clone());
        let orchestrator =
            match ExportOrchestrator::from_session(&provider, config.polling.clone(), filter).await {
                Ok(o) => o.with_access(config.access.clone()),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create session");
                    eprintln!("Failed to initialize export: {e}");
                    return Ok(EXIT_SESSION);
                }
            };

        let mut ctx = ExportContext::new(shutdown_signal);
        if let Some(timeout) = self
            .timeout
            .map(Duration::from_secs)
            .or_else(|| config.polling.timeout())
        {
            ctx = ctx.with_timeout(timeout);
        }

        println!("🚀 Exporting {} as {}...", request.image_id(), request.disk_image_format());

        match orchestrator.export(&request, ctx).await {
            Ok(artifact) => {
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&artifact)?);
                } else {
                    println!("✅ {artifact}");
                }
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("{e}");
                Ok(exit_code(&e))
            }
        }
    }

    fn apply_overrides(&self, config: &mut VmExportConfig) {
        if let Some(image_id) = &self.image_id {
            tracing::info!(image_id = %image_id, "Overriding image id from CLI");
            config.export.image_id = image_id.clone();
        }

        if let Some(format) = &self.format {
            tracing::info!(format = %format, "Overriding disk image format from CLI");
            config.export.disk_image_format = format.clone();
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }
    }
}

/// Maps an export error onto the process exit code
pub fn exit_code(err: &ExportError) -> i32 {
    match err {
        ExportError::Configuration(_) | ExportError::Validation(_) => EXIT_CONFIG,
        ExportError::Session(_) => EXIT_SESSION,
        ExportError::Cancelled {
            reason: CancelReason::DeadlineExceeded,
            ..
        } => EXIT_TIMEOUT,
        ExportError::Cancelled { .. } => EXIT_CANCELLED,
        _ => EXIT_EXPORT,
    }
}

fn print_request(request: &ExportRequest) {
    let destination = request.destination();
    println!("Export Request:");
    println!("  Image: {}", request.image_id());
    println!("  Format: {}", request.disk_image_format());
    println!(
        "  Destination: s3://{}/{}",
        destination.bucket,
        destination.prefix.as_deref().unwrap_or("")
    );
    println!("  Role: {}", request.role_name());
    println!("  Description: {}", request.description());
    if !request.tags().is_empty() {
        println!("  Tags: {:?}", request.tags());
    }
    println!();
}
