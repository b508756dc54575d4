// vmexport - Machine image export tool
// Copyright (c) 2025 vmexport Contributors
// Licensed under the MIT License

//! # vmexport - Machine image export
//!
//! vmexport turns a built machine image into a portable disk image (VMDK, RAW
//! or VHD) in object storage, using the EC2 image export task API.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Validating** export requests, reporting every problem at once
//! - **Submitting** exactly one export task per request
//! - **Polling** the task with a bounded, cancellable wait
//! - **Reporting** the exported object as an [`domain::ExportArtifact`]
//!
//! ## Architecture
//!
//! vmexport follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Export orchestration and status polling
//! - [`adapters`] - External integrations (EC2 export API)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management and request validation
//! - [`logging`] - Structured logging and secret redaction
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vmexport::adapters::aws::AwsSessionProvider;
//! use vmexport::config::{load_config, validate};
//! use vmexport::core::export::{ExportContext, ExportOrchestrator};
//! use vmexport::logging::RedactingFilter;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load configuration and validate the export request
//!     let config = load_config("vmexport.toml")?;
//!     let request = validate(&config.export)?;
//!
//!     // Connect and export
//!     let provider = AwsSessionProvider::new(config.access.clone());
//!     let filter = Arc::new(RedactingFilter::from_access(&config.access));
//!     let orchestrator =
//!         ExportOrchestrator::from_session(&provider, config.polling.clone(), filter).await?;
//!     let artifact = orchestrator.export(&request, ExportContext::background()).await?;
//!
//!     println!("Exported to {}", artifact.id());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! vmexport uses the [`domain::ExportError`] type for all errors. Callers can
//! tell a cancelled wait apart from a failed export:
//!
//! ```rust,no_run
//! use vmexport::domain::ExportError;
//!
//! fn report(err: &ExportError) {
//!     if err.is_cancelled() {
//!         eprintln!("gave up waiting for task {:?}", err.task_id());
//!     } else {
//!         eprintln!("export failed: {err}");
//!     }
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
