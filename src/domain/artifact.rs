//! Artifact handed to downstream consumers after a successful export

use super::ids::TaskId;
use super::task::ResultLocation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the step that produced an [`ExportArtifact`]
pub const BUILDER_ID: &str = "vmexport.amazon-export";

/// Result of one successful export run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportArtifact {
    /// Producer identifier, always [`BUILDER_ID`]
    pub builder_id: String,

    /// Remote task that produced the image
    pub task_id: TaskId,

    /// Where the exported image landed
    pub location: ResultLocation,
}

impl ExportArtifact {
    pub fn new(task_id: TaskId, location: ResultLocation) -> Self {
        Self {
            builder_id: BUILDER_ID.to_string(),
            task_id,
            location,
        }
    }

    /// Stable identifier of the artifact: its object URI
    pub fn id(&self) -> String {
        self.location.to_uri()
    }
}

impl fmt::Display for ExportArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Image exported by task {} to {}",
            self.task_id, self.location
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_display() {
        let artifact = ExportArtifact::new(
            TaskId::new("export-ami-9").unwrap(),
            ResultLocation::new("b", "export-ami-9.raw"),
        );
        assert_eq!(artifact.builder_id, BUILDER_ID);
        assert_eq!(artifact.id(), "s3://b/export-ami-9.raw");
        assert_eq!(
            artifact.to_string(),
            "Image exported by task export-ami-9 to s3://b/export-ami-9.raw"
        );
    }
}
