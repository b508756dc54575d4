//! Domain error types
//!
//! [`ExportError`] is the single outcome type of an export run. Adapter-level
//! failures are expressed as [`ServiceError`] so no HTTP client types leak
//! into the orchestrator, and configuration problems are collected into
//! [`ValidationErrors`] rather than reported one at a time.

use super::ids::TaskId;
use std::fmt;
use thiserror::Error;

/// Main export error type
///
/// Every variant raised after submission carries the task identifier so a
/// failure can be diagnosed (or the remote task inspected) without re-running.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Configuration could not be loaded or parsed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// One or more configuration values are invalid
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// No authenticated handle to the export service could be obtained
    #[error("Session error: {0}")]
    Session(String),

    /// The export service rejected the submission
    #[error("Export submission rejected: {0}")]
    Submission(String),

    /// Status queries kept failing transiently until the retry budget ran out
    #[error(
        "Polling export task {task_id} failed after {attempts} consecutive errors: {last_error}"
    )]
    PollExhausted {
        task_id: TaskId,
        attempts: u32,
        last_error: String,
    },

    /// A status query failed in a way retrying cannot fix
    #[error("Status query for export task {task_id} failed: {message}")]
    StatusQuery { task_id: TaskId, message: String },

    /// The remote task reported failure
    #[error("Export task {task_id} failed: {message}")]
    RemoteTaskFailed { task_id: TaskId, message: String },

    /// The remote task was cancelled or deleted on the service side
    #[error("Export task {task_id} was cancelled by the service")]
    RemoteTaskCancelled { task_id: TaskId },

    /// The task did not reach a terminal state within the attempt budget
    #[error("Export task {task_id} still running after {attempts} status checks")]
    WaitAttemptsExceeded { task_id: TaskId, attempts: u32 },

    /// The caller gave up waiting
    #[error("Export cancelled: {reason}{}", task_suffix(.task_id))]
    Cancelled {
        task_id: Option<TaskId>,
        reason: CancelReason,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ExportError {
    /// Remote task identifier, when the failure happened after submission
    pub fn task_id(&self) -> Option<&TaskId> {
        match self {
            Self::PollExhausted { task_id, .. }
            | Self::StatusQuery { task_id, .. }
            | Self::RemoteTaskFailed { task_id, .. }
            | Self::RemoteTaskCancelled { task_id }
            | Self::WaitAttemptsExceeded { task_id, .. } => Some(task_id),
            Self::Cancelled { task_id, .. } => task_id.as_ref(),
            _ => None,
        }
    }

    /// Whether the caller cancelled, as opposed to the export failing
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

fn task_suffix(task_id: &Option<TaskId>) -> String {
    match task_id {
        Some(id) => format!(" (export task {id} left running)"),
        None => String::new(),
    }
}

/// Why the caller stopped waiting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Shutdown signal received
    Shutdown,
    /// The context deadline passed
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shutdown => f.write_str("shutdown requested"),
            Self::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

/// Cloud export service errors
///
/// Errors raised by a `CloudExportService` implementation. These errors
/// don't expose third-party HTTP client types.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    /// Failed to reach the service
    #[error("Failed to connect to export service: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Request rate exceeded
    #[error("Request throttled: {0}")]
    Throttled(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Credentials rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Request rejected by the service (4xx with an API error code)
    #[error("{code}: {message}")]
    Rejected { code: String, message: String },

    /// Task not known to the service
    #[error("Export task not found: {0}")]
    TaskNotFound(String),

    /// Response could not be understood
    #[error("Invalid response from service: {0}")]
    InvalidResponse(String),
}

impl ServiceError {
    /// Whether retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_)
                | Self::Timeout(_)
                | Self::Throttled(_)
                | Self::ServerError { .. }
        )
    }
}

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Configuration key the error refers to
    pub field: String,

    /// Human readable description
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Ordered set of validation failures
///
/// # Example
///
/// ```
/// use vmexport::domain::errors::{FieldError, ValidationErrors};
///
/// let mut errors = ValidationErrors::default();
/// errors.push(FieldError::new("image_id", "no value provided"));
/// errors.push(FieldError::new("s3_bucket_name", "no value provided"));
///
/// assert_eq!(errors.len(), 2);
/// assert_eq!(errors.fields(), vec!["image_id", "s3_bucket_name"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Names of the offending fields, in report order
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    /// Returns `Ok(())` when empty, otherwise the whole set
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error(s) occurred", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  * {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ExportError {
    fn from(err: toml::de::Error) -> Self {
        ExportError::Configuration(format!("TOML parse error: {err}"))
    }
}
