//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that flow between the validator,
//! the orchestrator and the cloud export service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source machine image identifier
///
/// Supplied by the upstream image build step (for EC2 an AMI id such as
/// `ami-0123456789abcdef0`). Only non-emptiness is checked here; the cloud
/// service is the authority on whether the image exists.
///
/// # Examples
///
/// ```
/// use vmexport::domain::ids::ImageId;
/// use std::str::FromStr;
///
/// let image_id = ImageId::from_str("ami-0123456789abcdef0").unwrap();
/// assert_eq!(image_id.as_str(), "ami-0123456789abcdef0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId(String);

impl ImageId {
    /// Creates a new ImageId, trimming surrounding whitespace
    ///
    /// # Returns
    ///
    /// Returns `Ok(ImageId)` if the ID is non-empty, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err("Image ID cannot be empty".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the image ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ImageId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ImageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Remote export task identifier
///
/// Assigned by the cloud export service when a submission is accepted
/// (for EC2, `export-ami-...`). It is the only durable reference kept for
/// the duration of an export and is attached to every post-submission error.
///
/// # Examples
///
/// ```
/// use vmexport::domain::ids::TaskId;
///
/// let task_id = TaskId::new("export-ami-0a1b2c3d4e5f").unwrap();
/// assert_eq!(task_id.to_string(), "export-ami-0a1b2c3d4e5f");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a new TaskId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Task ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the task ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
