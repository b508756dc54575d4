//! Domain models and types for vmexport.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ImageId`], [`TaskId`])
//! - **The validated request** ([`ExportRequest`], [`DiskImageFormat`])
//! - **The remote task model** ([`ExportTask`], [`TaskState`], [`ResultLocation`])
//! - **The downstream artifact** ([`ExportArtifact`])
//! - **Error types** ([`ExportError`], [`ServiceError`], [`ValidationErrors`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, ExportError>`]. Errors raised
//! after submission carry the remote task id:
//!
//! ```rust
//! use vmexport::domain::{ExportError, TaskId};
//!
//! let err = ExportError::RemoteTaskFailed {
//!     task_id: TaskId::new("export-ami-1").unwrap(),
//!     message: "disk corrupt".to_string(),
//! };
//! assert_eq!(err.task_id().map(|t| t.as_str()), Some("export-ami-1"));
//! ```

pub mod artifact;
pub mod errors;
pub mod ids;
pub mod request;
pub mod result;
pub mod task;

// Re-export commonly used types for convenience
pub use artifact::{ExportArtifact, BUILDER_ID};
pub use errors::{CancelReason, ExportError, FieldError, ServiceError, ValidationErrors};
pub use ids::{ImageId, TaskId};
pub use request::{
    DiskImageFormat, ExportRequest, S3Destination, DEFAULT_DESCRIPTION, DEFAULT_ROLE_NAME,
};
pub use result::Result;
pub use task::{ExportTask, ResultLocation, TaskState};
