//! Remote export task model
//!
//! An [`ExportTask`] is a snapshot of the remote unit of work as reported by
//! the cloud export service. The orchestrator observes snapshots, it never
//! mutates them.

use super::ids::TaskId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a remote export task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Accepted by the service, no progress reported yet
    Submitted,
    /// Conversion or upload is running
    InProgress,
    /// Image landed in object storage
    Completed,
    /// Service reported a failure
    Failed,
    /// Task was cancelled or deleted on the service side
    Cancelled,
}

impl TaskState {
    /// Whether no further transition can occur from this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Submitted => "submitted",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Object storage location of an exported image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultLocation {
    pub bucket: String,
    pub key: String,
}

impl ResultLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// `s3://bucket/key` form
    pub fn to_uri(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}

impl fmt::Display for ResultLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

/// Snapshot of a remote export task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportTask {
    /// Identifier assigned on submission
    pub task_id: TaskId,

    /// Current state
    pub state: TaskState,

    /// Result location, present once the task completed
    pub location: Option<ResultLocation>,

    /// Status message: failure detail, or progress text while running
    pub status_message: Option<String>,

    /// Progress percentage, when the service reports one
    pub progress: Option<u8>,
}

impl ExportTask {
    /// Creates a snapshot with only an id and state
    pub fn new(task_id: TaskId, state: TaskState) -> Self {
        Self {
            task_id,
            state,
            location: None,
            status_message: None,
            progress: None,
        }
    }

    /// Sets the result location
    pub fn with_location(mut self, location: ResultLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Sets the status message
    pub fn with_status_message(mut self, message: impl Into<String>) -> Self {
        self.status_message = Some(message.into());
        self
    }

    /// Sets the progress percentage, clamped to 100
    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress.min(100));
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
