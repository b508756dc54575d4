//! Cloud export service contract
//!
//! The orchestrator only talks to the export backend through
//! [`CloudExportService`]. Implementations take `&self`, hold no per-export
//! state, and must be safe to share between concurrent exports.

use crate::domain::errors::ServiceError;
use crate::domain::ids::TaskId;
use crate::domain::request::ExportRequest;
use crate::domain::task::ExportTask;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Parameters of one export submission
///
/// Built from a validated [`ExportRequest`] with the description template
/// rendered for the submission time.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSubmission {
    pub client_token: Option<String>,
    pub description: String,
    pub disk_image_format: String,
    pub image_id: String,
    pub role_name: String,
    pub s3_bucket: String,
    pub s3_prefix: Option<String>,
    pub tags: BTreeMap<String, String>,
}

impl ExportSubmission {
    /// Maps a validated request onto submission parameters
    pub fn from_request(request: &ExportRequest, now: DateTime<Utc>) -> Self {
        Self {
            client_token: request.client_token().map(str::to_string),
            description: request.render_description(now),
            disk_image_format: request.disk_image_format().as_str().to_string(),
            image_id: request.image_id().to_string(),
            role_name: request.role_name().to_string(),
            s3_bucket: request.destination().bucket.clone(),
            s3_prefix: request.destination().prefix.clone(),
            tags: request.tags().clone(),
        }
    }
}

/// Asynchronous image export backend
///
/// # Example
///
/// ```no_run
/// use vmexport::adapters::aws::{CloudExportService, ExportSubmission};
/// use vmexport::domain::TaskState;
///
/// # async fn example(
/// #     service: &dyn CloudExportService,
/// #     submission: ExportSubmission,
/// # ) -> Result<(), Box<dyn std::error::Error>> {
/// let task_id = service.submit_export(&submission).await?;
/// let task = service.get_export_status(&task_id).await?;
/// if task.state == TaskState::Completed {
///     println!("done: {:?}", task.location);
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait CloudExportService: Send + Sync {
    /// Starts an export task and returns its identifier
    async fn submit_export(&self, submission: &ExportSubmission) -> Result<TaskId, ServiceError>;

    /// Fetches the current state of an export task
    async fn get_export_status(&self, task_id: &TaskId) -> Result<ExportTask, ServiceError>;
}
