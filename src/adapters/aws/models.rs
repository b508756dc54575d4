//! EC2 Query API response models
//!
//! EC2 answers with small, flat XML documents. Only a handful of elements
//! are needed, so they are pulled out by tag name instead of mapping the
//! full schema.

use crate::domain::errors::ServiceError;
use crate::domain::ids::TaskId;
use crate::domain::task::{ExportTask, TaskState};
use regex::Regex;
use std::sync::LazyLock;

/// API error codes that mean "slow down"
const THROTTLING_CODES: &[&str] = &[
    "RequestLimitExceeded",
    "Throttling",
    "ThrottlingException",
    "RequestThrottled",
];

/// API error codes that mean the credentials were rejected
const AUTH_CODES: &[&str] = &[
    "AuthFailure",
    "UnauthorizedOperation",
    "InvalidClientTokenId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
    "RequestExpired",
];

const TASK_NOT_FOUND_CODE: &str = "InvalidExportImageTaskId.NotFound";

/// `<Error>` element of an EC2 error response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    /// Parses an error response body, if it is one
    pub fn parse(xml: &str) -> Option<Self> {
        let code = extract_tag(xml, "Code")?;
        let message = extract_tag(xml, "Message").unwrap_or_default();
        Some(Self { code, message })
    }

    /// Maps the error onto a [`ServiceError`] given the HTTP status
    pub fn into_service_error(self, status: u16) -> ServiceError {
        if THROTTLING_CODES.contains(&self.code.as_str()) {
            return ServiceError::Throttled(format!("{}: {}", self.code, self.message));
        }
        if status >= 500 {
            return ServiceError::ServerError {
                status,
                message: format!("{}: {}", self.code, self.message),
            };
        }
        if AUTH_CODES.contains(&self.code.as_str()) {
            return ServiceError::AuthenticationFailed(format!("{}: {}", self.code, self.message));
        }
        if self.code == TASK_NOT_FOUND_CODE {
            return ServiceError::TaskNotFound(self.message);
        }
        ServiceError::Rejected {
            code: self.code,
            message: self.message,
        }
    }
}

/// Parses an `ExportImageResponse` into the new task id
pub fn parse_export_image_response(xml: &str) -> Result<TaskId, ServiceError> {
    let id = extract_tag(xml, "exportImageTaskId").ok_or_else(|| {
        ServiceError::InvalidResponse("ExportImage response has no exportImageTaskId".to_string())
    })?;
    TaskId::new(id).map_err(ServiceError::InvalidResponse)
}

/// Parses a `DescribeExportImageTasksResponse` for a single task
///
/// EC2 statuses map as follows: `active` is `Submitted` until a progress
/// value appears and `InProgress` afterwards; `completed` is `Completed`;
/// `failed` is `Failed`; `deleting`/`deleted` are `Failed` when the service
/// left a status message explaining why, otherwise `Cancelled`.
pub fn parse_describe_response(xml: &str, task_id: &TaskId) -> Result<ExportTask, ServiceError> {
    // Only one task is requested, so its fields are the only ones present
    let reported_id = extract_tag(xml, "exportImageTaskId")
        .ok_or_else(|| ServiceError::TaskNotFound(task_id.to_string()))?;
    if reported_id != task_id.as_str() {
        return Err(ServiceError::InvalidResponse(format!(
            "expected export task {task_id}, service described '{reported_id}'"
        )));
    }

    let status = extract_tag(xml, "status").ok_or_else(|| {
        ServiceError::InvalidResponse(format!("export task {task_id} has no status"))
    })?;
    let status_message = extract_tag(xml, "statusMessage").filter(|m| !m.is_empty());
    let progress = extract_tag(xml, "progress").and_then(|p| p.trim().parse::<u8>().ok());

    let state = match status.as_str() {
        "active" if progress.is_some() => TaskState::InProgress,
        "active" => TaskState::Submitted,
        "completed" => TaskState::Completed,
        "failed" => TaskState::Failed,
        "deleting" | "deleted" if status_message.is_some() => TaskState::Failed,
        "deleting" | "deleted" => TaskState::Cancelled,
        other => {
            return Err(ServiceError::InvalidResponse(format!(
                "unknown export task status '{other}'"
            )))
        }
    };

    let mut task = ExportTask::new(task_id.clone(), state);
    if let Some(message) = status_message {
        task = task.with_status_message(message);
    }
    if let Some(progress) = progress {
        task = task.with_progress(progress);
    }
    Ok(task)
}

/// Text-only elements; every field read from EC2 responses is one
static LEAF_ELEMENT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"<([A-Za-z][\w.-]*)>([^<]*)</([A-Za-z][\w.-]*)>").ok());

/// Returns the unescaped text of the first `<tag>...</tag>` element
pub(crate) fn extract_tag(xml: &str, tag: &str) -> Option<String> {
    let re = LEAF_ELEMENT.as_ref()?;
    re.captures_iter(xml)
        .find(|cap| &cap[1] == tag && &cap[3] == tag)
        .map(|cap| unescape(cap[2].trim()))
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
