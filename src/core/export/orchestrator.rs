//! Export orchestrator
//!
//! Drives one export request through submission and status polling:
//!
//! 1. Log the request and access configuration through the secret filter
//! 2. Submit the export exactly once
//! 3. Poll the task with a configurable delay until it reaches a terminal
//!    state, retrying transient query errors
//! 4. Turn the completed task into an [`ExportArtifact`]
//!
//! Every wait and every status query races the caller's [`ExportContext`].
//! On cancellation the remote task is left running.

use super::poll::{Delay, ExportContext, TokioDelay};
use crate::adapters::aws::{CloudExportService, ExportSubmission, SessionProvider};
use crate::config::{AccessConfig, PollingConfig};
use crate::domain::errors::{CancelReason, ExportError};
use crate::domain::ids::TaskId;
use crate::domain::request::ExportRequest;
use crate::domain::result::Result;
use crate::domain::task::{ExportTask, ResultLocation, TaskState};
use crate::domain::ExportArtifact;
use crate::logging::{export_span, SecretFilter};
use crate::{log_export_complete, log_poll_attempt, log_retry_attempt};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, Span};

/// Runs export requests against a [`CloudExportService`]
///
/// Holds no per-export state; one orchestrator can serve many concurrent
/// `export` calls.
///
/// # Example
///
/// ```rust,no_run
/// use vmexport::adapters::aws::AwsSessionProvider;
/// use vmexport::config::load_config;
/// use vmexport::core::export::{ExportContext, ExportOrchestrator};
/// use vmexport::logging::RedactingFilter;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config("vmexport.toml")?;
/// let request = vmexport::config::validate(&config.export)?;
///
/// let provider = AwsSessionProvider::new(config.access.clone());
/// let filter = Arc::new(RedactingFilter::from_access(&config.access));
/// let orchestrator = ExportOrchestrator::from_session(&provider, config.polling.clone(), filter)
///     .await?
///     .with_access(config.access.clone());
///
/// let artifact = orchestrator.export(&request, ExportContext::background()).await?;
/// println!("{artifact}");
/// # Ok(())
/// # }
/// ```
pub struct ExportOrchestrator {
    service: Arc<dyn CloudExportService>,
    polling: PollingConfig,
    filter: Arc<dyn SecretFilter>,
    delay: Arc<dyn Delay>,
    access: Option<AccessConfig>,
}

impl ExportOrchestrator {
    pub fn new(
        service: Arc<dyn CloudExportService>,
        polling: PollingConfig,
        filter: Arc<dyn SecretFilter>,
        delay: Arc<dyn Delay>,
    ) -> Self {
        Self {
            service,
            polling,
            filter,
            delay,
            access: None,
        }
    }

    /// Acquires a service handle from `provider` and builds an orchestrator
    /// that sleeps with [`TokioDelay`]
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Session`] if the provider cannot connect
    pub async fn from_session(
        provider: &dyn SessionProvider,
        polling: PollingConfig,
        filter: Arc<dyn SecretFilter>,
    ) -> Result<Self> {
        let service = provider.connect().await.map_err(|e| match e {
            ExportError::Session(message) => ExportError::Session(message),
            other => ExportError::Session(other.to_string()),
        })?;
        Ok(Self::new(service, polling, filter, Arc::new(TokioDelay)))
    }

    /// Access configuration to describe in the pre-submission log
    pub fn with_access(mut self, access: AccessConfig) -> Self {
        self.access = Some(access);
        self
    }

    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    /// Exports the image described by `request`
    ///
    /// # Errors
    ///
    /// - [`ExportError::Submission`] if the service rejects the submission
    /// - [`ExportError::RemoteTaskFailed`] / [`ExportError::RemoteTaskCancelled`]
    ///   if the task ends without producing an image
    /// - [`ExportError::PollExhausted`] / [`ExportError::StatusQuery`] if the
    ///   task status cannot be read
    /// - [`ExportError::WaitAttemptsExceeded`] if `max_attempts` runs out
    /// - [`ExportError::Cancelled`] if `ctx` is cancelled after submission
    pub async fn export(&self, request: &ExportRequest, ctx: ExportContext) -> Result<ExportArtifact> {
        self.run(request, ctx).instrument(export_span(request)).await
    }

    async fn run(&self, request: &ExportRequest, ctx: ExportContext) -> Result<ExportArtifact> {
        let started = Instant::now();
        let (request_description, access_description) = self.describe(request);
        tracing::info!(
            request = %request_description,
            access = access_description.as_deref().unwrap_or("<none>"),
            "Starting image export"
        );

        let submission = ExportSubmission::from_request(request, Utc::now());
        let task_id = self.service.submit_export(&submission).await.map_err(|e| {
            tracing::error!(image_id = %request.image_id(), error = %e, "Export submission failed");
            ExportError::Submission(e.to_string())
        })?;

        Span::current().record("task_id", tracing::field::display(&task_id));
        tracing::info!(task_id = %task_id, "Export task submitted");

        let task = self.wait_for_completion(&task_id, &ctx).await?;
        let location = task
            .location
            .clone()
            .unwrap_or_else(|| default_location(request, &task_id));

        log_export_complete!(task_id, location, started.elapsed());
        Ok(ExportArtifact::new(task_id, location))
    }

    /// Polls until the task is terminal, returning it only when completed
    async fn wait_for_completion(&self, task_id: &TaskId, ctx: &ExportContext) -> Result<ExportTask> {
        let max_attempts = self.polling.max_attempts;
        let max_poll_errors = self.polling.max_poll_errors.max(1);
        let mut attempts: u32 = 0;
        let mut consecutive_errors: u32 = 0;

        loop {
            if let Some(reason) = ctx.check() {
                return Err(cancelled(task_id, reason));
            }
            if max_attempts > 0 && attempts >= max_attempts {
                return Err(ExportError::WaitAttemptsExceeded {
                    task_id: task_id.clone(),
                    attempts,
                });
            }

            let delay = self.polling.delay_for(attempts);
            tokio::select! {
                biased;
                reason = ctx.cancelled() => return Err(cancelled(task_id, reason)),
                _ = self.delay.wait(delay) => {}
            }

            attempts += 1;
            let result = tokio::select! {
                biased;
                reason = ctx.cancelled() => return Err(cancelled(task_id, reason)),
                result = self.service.get_export_status(task_id) => result,
            };

            match result {
                Ok(task) => {
                    consecutive_errors = 0;
                    log_poll_attempt!(task_id, attempts, task.state);

                    match task.state {
                        TaskState::Completed => return Ok(task),
                        TaskState::Failed => {
                            let message = task
                                .status_message
                                .unwrap_or_else(|| "no status message reported".to_string());
                            tracing::error!(task_id = %task_id, message = %message, "Export task failed");
                            return Err(ExportError::RemoteTaskFailed {
                                task_id: task_id.clone(),
                                message,
                            });
                        }
                        TaskState::Cancelled => {
                            return Err(ExportError::RemoteTaskCancelled {
                                task_id: task_id.clone(),
                            })
                        }
                        TaskState::Submitted | TaskState::InProgress => {
                            if let Some(progress) = task.progress {
                                tracing::info!(task_id = %task_id, progress = progress, "Export in progress");
                            }
                        }
                    }
                }
                Err(e) if e.is_transient() => {
                    consecutive_errors += 1;
                    if consecutive_errors >= max_poll_errors {
                        tracing::error!(
                            task_id = %task_id,
                            errors = consecutive_errors,
                            error = %e,
                            "Giving up on export status queries"
                        );
                        return Err(ExportError::PollExhausted {
                            task_id: task_id.clone(),
                            attempts: consecutive_errors,
                            last_error: e.to_string(),
                        });
                    }
                    log_retry_attempt!(consecutive_errors, max_poll_errors, e);
                }
                Err(e) => {
                    return Err(ExportError::StatusQuery {
                        task_id: task_id.clone(),
                        message: e.to_string(),
                    })
                }
            }
        }
    }

    /// Redacted descriptions of the request and access configuration
    pub(crate) fn describe(&self, request: &ExportRequest) -> (String, Option<String>) {
        let request_description = self.filter.redact(&format!("{request:?}"));
        let access_description = self
            .access
            .as_ref()
            .map(|access| self.filter.redact(&format!("{access:?}")));
        (request_description, access_description)
    }
}

fn cancelled(task_id: &TaskId, reason: CancelReason) -> ExportError {
    tracing::warn!(task_id = %task_id, reason = %reason, "Export wait cancelled, task left running");
    ExportError::Cancelled {
        task_id: Some(task_id.clone()),
        reason,
    }
}

/// Object written by the export service: `{prefix}{task_id}.{extension}`
pub fn default_location(request: &ExportRequest, task_id: &TaskId) -> ResultLocation {
    let destination = request.destination();
    let prefix = destination.prefix.as_deref().unwrap_or("");
    ResultLocation::new(
        destination.bucket.clone(),
        format!(
            "{prefix}{task_id}.{}",
            request.disk_image_format().extension()
        ),
    )
}
