//! Core business logic for vmexport.
//!
//! # Modules
//!
//! - [`export`] - Export orchestration and status polling
//!
//! # Export Workflow
//!
//! 1. **Validate**: Turn the raw `[export]` section into an `ExportRequest`
//! 2. **Connect**: Resolve credentials and region into a service session
//! 3. **Submit**: Start one remote export task
//! 4. **Poll**: Query the task until it completes, fails or the caller gives up
//! 5. **Report**: Hand back an `ExportArtifact` naming the exported object
//!
//! # Example
//!
//! ```rust,no_run
//! use vmexport::config::{load_config, validate};
//! use vmexport::core::export::{ExportContext, ExportOrchestrator};
//! use vmexport::adapters::aws::AwsSessionProvider;
//! use vmexport::logging::RedactingFilter;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("vmexport.toml")?;
//! let request = validate(&config.export)?;
//!
//! // Create shutdown signal
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let provider = AwsSessionProvider::new(config.access.clone());
//! let filter = Arc::new(RedactingFilter::from_access(&config.access));
//! let orchestrator =
//!     ExportOrchestrator::from_session(&provider, config.polling.clone(), filter).await?;
//!
//! let artifact = orchestrator.export(&request, ExportContext::new(shutdown_rx)).await?;
//! println!("Exported to {}", artifact.id());
//! # Ok(())
//! # }
//! ```

pub mod export;
