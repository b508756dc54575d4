//! Logging and observability
//!
//! This module provides:
//! - Structured console and JSON file logging ([`init_logging`]), with a
//!   per-export span ([`export_span`])
//! - Secret filtering for anything that describes configuration
//!   ([`SecretFilter`], [`RedactingFilter`], [`NoopFilter`])
//! - Logging macros for the export lifecycle
//!
//! # Example
//!
//! ```no_run
//! use vmexport::logging::init_logging;
//! use vmexport::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(image_id = "ami-123", "Export requested");
//! ```

pub mod redact;
pub mod structured;

// Re-export commonly used items
pub use redact::{NoopFilter, RedactingFilter, SecretFilter, REDACTED};
pub use structured::{export_span, init_logging, LoggingGuard, EXPORT_SPAN, LOG_FILE_NAME};

/// Log a status query result
///
/// # Example
///
/// ```no_run
/// use vmexport::log_poll_attempt;
///
/// log_poll_attempt!("export-ami-1", 3, "in_progress");
/// ```
#[macro_export]
macro_rules! log_poll_attempt {
    ($task_id:expr, $attempt:expr, $state:expr) => {
        tracing::debug!(
            task_id = %$task_id,
            attempt = $attempt,
            state = %$state,
            "Polled export task"
        );
    };
}

/// Log the completion of an export
///
/// # Example
///
/// ```no_run
/// use vmexport::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!("export-ami-1", "s3://bucket/key.vmdk", Duration::from_secs(600));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($task_id:expr, $location:expr, $duration:expr) => {
        tracing::info!(
            task_id = %$task_id,
            location = %$location,
            duration_ms = $duration.as_millis() as u64,
            "Export completed"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use vmexport::log_retry_attempt;
///
/// log_retry_attempt!(2, 5, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying status query"
        );
    };
}
