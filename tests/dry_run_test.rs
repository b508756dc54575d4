//! Integration tests for dry-run mode
//!
//! These tests verify that dry-run validates the request without ever
//! contacting the export service.

use mockito::Server;
use std::io::Write;
use tempfile::NamedTempFile;
use tokio::sync::watch;
use vmexport::cli::commands::export::ExportArgs;

fn args(dry_run: bool) -> ExportArgs {
    ExportArgs {
        dry_run,
        image_id: None,
        format: None,
        timeout: None,
        json: false,
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn test_dry_run_flag_skips_service() {
    let mut server = Server::new_async().await;
    let untouched = server.mock("POST", "/").expect(0).create_async().await;

    let config = write_config(&format!(
        r#"
[access]
region = "us-east-1"
access_key = "AKID"
secret_key = "secret"
custom_endpoint_ec2 = "{}"

[export]
image_id = "ami-1"
disk_image_format = "vmdk"
s3_bucket_name = "exports"
"#,
        server.url()
    ));

    let (_tx, rx) = watch::channel(false);
    let code = args(true)
        .execute(config.path().to_str().unwrap(), rx)
        .await
        .unwrap();

    assert_eq!(code, 0);
    untouched.assert_async().await;
}

#[tokio::test]
async fn test_dry_run_from_config() {
    let mut server = Server::new_async().await;
    let untouched = server.mock("POST", "/").expect(0).create_async().await;

    let config = write_config(&format!(
        r#"
[application]
dry_run = true

[access]
region = "us-east-1"
custom_endpoint_ec2 = "{}"

[export]
image_id = "ami-1"
disk_image_format = "RAW"
s3_bucket_name = "exports"
"#,
        server.url()
    ));

    let (_tx, rx) = watch::channel(false);
    let code = args(false)
        .execute(config.path().to_str().unwrap(), rx)
        .await
        .unwrap();

    assert_eq!(code, 0);
    untouched.assert_async().await;
}

#[tokio::test]
async fn test_dry_run_still_validates() {
    let config = write_config(
        r#"
[export]
disk_image_format = "qcow2"
"#,
    );

    let (_tx, rx) = watch::channel(false);
    let code = args(true)
        .execute(config.path().to_str().unwrap(), rx)
        .await
        .unwrap();

    assert_eq!(code, 2);
}

#[tokio::test]
async fn test_missing_credentials_is_session_error() {
    let config = write_config(
        r#"
[access]
region = "us-east-1"
custom_endpoint_ec2 = "http://127.0.0.1:9"

[export]
image_id = "ami-1"
disk_image_format = "vmdk"
s3_bucket_name = "exports"
"#,
    );

    // Only meaningful when the environment carries no credentials either
    if std::env::var("AWS_ACCESS_KEY_ID").is_ok() {
        return;
    }

    let (_tx, rx) = watch::channel(false);
    let code = args(false)
        .execute(config.path().to_str().unwrap(), rx)
        .await
        .unwrap();

    assert_eq!(code, 4);
}
