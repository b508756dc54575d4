//! End-to-end export flow against a mock EC2 endpoint
//!
//! These tests verify that:
//! - A session built from configuration reaches the configured endpoint
//! - One submission is followed by polling until completion
//! - Remote failures and shutdown signals surface as distinct errors

use mockito::{Matcher, Mock, Server, ServerGuard};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use vmexport::adapters::aws::AwsSessionProvider;
use vmexport::config::{secret_string, AccessConfig, PollingConfig, RawExportConfig};
use vmexport::core::export::{ExportContext, ExportOrchestrator};
use vmexport::domain::{CancelReason, ExportError, ExportRequest};
use vmexport::logging::RedactingFilter;

const TASK_ID: &str = "export-ami-0123456789abcdef0";

fn access(server: &ServerGuard) -> AccessConfig {
    AccessConfig {
        region: Some("us-east-1".to_string()),
        access_key: Some("AKIDEXAMPLE".to_string()),
        secret_key: Some(secret_string("wJalrXUtnFEMI".to_string())),
        token: None,
        custom_endpoint_ec2: Some(server.url()),
        request_timeout_seconds: 5,
    }
}

fn polling(delay_seconds: u64) -> PollingConfig {
    PollingConfig {
        delay_seconds,
        max_delay_seconds: delay_seconds.max(1),
        backoff_multiplier: 1.0,
        max_attempts: 0,
        max_poll_errors: 3,
        timeout_seconds: 0,
    }
}

fn request() -> ExportRequest {
    vmexport::config::validate(&RawExportConfig {
        image_id: "ami-0123456789abcdef0".to_string(),
        disk_image_format: "vmdk".to_string(),
        s3_bucket_name: "exports".to_string(),
        s3_bucket_prefix: "images/".to_string(),
        ..Default::default()
    })
    .unwrap()
}

async fn mock_submit(server: &mut ServerGuard) -> Mock {
    server
        .mock("POST", "/")
        .match_body(Matcher::UrlEncoded(
            "Action".to_string(),
            "ExportImage".to_string(),
        ))
        .with_status(200)
        .with_body(format!(
            "<ExportImageResponse><exportImageTaskId>{TASK_ID}</exportImageTaskId><status>active</status></ExportImageResponse>"
        ))
        .expect(1)
        .create_async()
        .await
}

async fn mock_describe(server: &mut ServerGuard, status: &str, extra: &str) -> Mock {
    server
        .mock("POST", "/")
        .match_body(Matcher::UrlEncoded(
            "Action".to_string(),
            "DescribeExportImageTasks".to_string(),
        ))
        .with_status(200)
        .with_body(format!(
            "<DescribeExportImageTasksResponse><exportImageTaskSet><item><exportImageTaskId>{TASK_ID}</exportImageTaskId><status>{status}</status>{extra}</item></exportImageTaskSet></DescribeExportImageTasksResponse>"
        ))
        .create_async()
        .await
}

async fn orchestrator(server: &ServerGuard, polling: PollingConfig) -> ExportOrchestrator {
    let access = access(server);
    let provider = AwsSessionProvider::new(access.clone());
    let filter = Arc::new(RedactingFilter::from_access(&access));
    ExportOrchestrator::from_session(&provider, polling, filter)
        .await
        .unwrap()
        .with_access(access)
}

#[tokio::test]
async fn test_export_completes() {
    let mut server = Server::new_async().await;
    let submit = mock_submit(&mut server).await;
    let describe = server
        .mock("POST", "/")
        .match_body(Matcher::UrlEncoded(
            "Action".to_string(),
            "DescribeExportImageTasks".to_string(),
        ))
        .with_status(200)
        .with_body(format!(
            "<DescribeExportImageTasksResponse><exportImageTaskSet><item><exportImageTaskId>{TASK_ID}</exportImageTaskId><status>completed</status><progress>100</progress></item></exportImageTaskSet></DescribeExportImageTasksResponse>"
        ))
        .expect(1)
        .create_async()
        .await;

    let artifact = orchestrator(&server, polling(0))
        .await
        .export(&request(), ExportContext::background())
        .await
        .unwrap();

    assert_eq!(artifact.task_id.as_str(), TASK_ID);
    assert_eq!(artifact.builder_id, "vmexport.amazon-export");
    assert_eq!(
        artifact.id(),
        "s3://exports/images/export-ami-0123456789abcdef0.vmdk"
    );
    submit.assert_async().await;
    describe.assert_async().await;
}

#[tokio::test]
async fn test_remote_failure_surfaces_message() {
    let mut server = Server::new_async().await;
    let submit = mock_submit(&mut server).await;
    mock_describe(
        &mut server,
        "failed",
        "<statusMessage>disk corrupt</statusMessage>",
    )
    .await;

    let err = orchestrator(&server, polling(0))
        .await
        .export(&request(), ExportContext::background())
        .await
        .unwrap_err();

    match err {
        ExportError::RemoteTaskFailed { task_id, message } => {
            assert_eq!(task_id.as_str(), TASK_ID);
            assert_eq!(message, "disk corrupt");
        }
        other => panic!("unexpected error: {other}"),
    }
    submit.assert_async().await;
}

#[tokio::test]
async fn test_submission_rejected() {
    let mut server = Server::new_async().await;
    let submit = server
        .mock("POST", "/")
        .with_status(400)
        .with_body("<Response><Errors><Error><Code>InvalidAMIID.NotFound</Code><Message>The image id does not exist</Message></Error></Errors></Response>")
        .expect(1)
        .create_async()
        .await;

    let err = orchestrator(&server, polling(0))
        .await
        .export(&request(), ExportContext::background())
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Submission(_)));
    assert!(err.to_string().contains("InvalidAMIID.NotFound"));
    // Only the submission reached the server
    submit.assert_async().await;
}

#[tokio::test]
async fn test_shutdown_while_waiting() {
    let mut server = Server::new_async().await;
    mock_submit(&mut server).await;
    mock_describe(&mut server, "active", "<progress>10</progress>").await;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        let _ = shutdown_tx.send(true);
    });

    let err = orchestrator(&server, polling(1))
        .await
        .export(&request(), ExportContext::new(shutdown_rx))
        .await
        .unwrap_err();

    match &err {
        ExportError::Cancelled { task_id, reason } => {
            assert_eq!(task_id.as_ref().map(|t| t.as_str()), Some(TASK_ID));
            assert_eq!(*reason, CancelReason::Shutdown);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("left running"));
}

#[tokio::test]
async fn test_deadline_while_waiting() {
    let mut server = Server::new_async().await;
    mock_submit(&mut server).await;
    mock_describe(&mut server, "active", "").await;

    let ctx = ExportContext::background().with_timeout(Duration::from_millis(200));
    let err = orchestrator(&server, polling(1))
        .await
        .export(&request(), ctx)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExportError::Cancelled {
            reason: CancelReason::DeadlineExceeded,
            ..
        }
    ));
}
