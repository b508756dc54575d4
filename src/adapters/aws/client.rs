//! EC2 export client
//!
//! Implements [`CloudExportService`] against the EC2 Query API using
//! SigV4-signed form POSTs.

use super::models::{parse_describe_response, parse_export_image_response, ApiError};
use super::service::{CloudExportService, ExportSubmission};
use super::sigv4::{Credentials, Signer};
use crate::domain::errors::{ExportError, ServiceError};
use crate::domain::ids::TaskId;
use crate::domain::result::Result;
use crate::domain::task::ExportTask;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HOST};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use url::Url;

/// EC2 API version used for every call
pub const API_VERSION: &str = "2016-11-15";

/// Resource type for tagging export tasks at creation
const TAG_RESOURCE_TYPE: &str = "export-image-task";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// EC2 client for image export tasks
///
/// # Example
///
/// ```no_run
/// use vmexport::adapters::aws::{Credentials, Ec2ExportClient};
/// use vmexport::config::secret_string;
/// use std::time::Duration;
///
/// # fn example() -> vmexport::domain::Result<()> {
/// let credentials = Credentials {
///     access_key_id: "AKIDEXAMPLE".to_string(),
///     secret_access_key: secret_string("secret".to_string()),
///     session_token: None,
/// };
/// let endpoint = url::Url::parse("https://ec2.us-east-1.amazonaws.com").unwrap();
/// let client = Ec2ExportClient::new(endpoint, "us-east-1", credentials, Duration::from_secs(30))?;
/// # Ok(())
/// # }
/// ```
pub struct Ec2ExportClient {
    endpoint: Url,
    host: String,
    signer: Signer,
    client: Client,
}

impl Ec2ExportClient {
    /// Create a new client for `endpoint`
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Session`] if the endpoint has no host or the
    /// HTTP client cannot be built
    pub fn new(
        endpoint: Url,
        region: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self> {
        let host = match (endpoint.host_str(), endpoint.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(ExportError::Session(format!(
                    "EC2 endpoint '{endpoint}' has no host"
                )))
            }
        };

        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ExportError::Session(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint,
            host,
            signer: Signer::new(credentials, region, "ec2"),
            client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Performs one signed Query API call and returns the response body
    async fn call(&self, action: &str, params: &[(String, String)]) -> std::result::Result<String, ServiceError> {
        // The serializer is !Send and must not live across an await
        let body = {
            let mut serializer = url::form_urlencoded::Serializer::new(String::new());
            serializer.append_pair("Action", action);
            serializer.append_pair("Version", API_VERSION);
            for (key, value) in params {
                serializer.append_pair(key, value);
            }
            serializer.finish()
        };

        let signed = self
            .signer
            .sign_post(&self.host, FORM_CONTENT_TYPE, &body, Utc::now());

        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header(HOST, &self.host)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header("x-amz-date", &signed.amz_date)
            .header(AUTHORIZATION, &signed.authorization);
        if let Some(token) = &signed.security_token {
            request = request.header("x-amz-security-token", token);
        }

        tracing::debug!(action = action, endpoint = %self.endpoint, "Calling EC2");

        let response = request.body(body).send().await.map_err(map_transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;

        if status.is_success() {
            return Ok(text);
        }

        let status = status.as_u16();
        match ApiError::parse(&text) {
            Some(api_error) => Err(api_error.into_service_error(status)),
            None if status >= 500 => Err(ServiceError::ServerError {
                status,
                message: text,
            }),
            None => Err(ServiceError::Rejected {
                code: format!("HTTP{status}"),
                message: text,
            }),
        }
    }
}

/// Query parameters for an `ExportImage` call
pub(crate) fn export_image_params(submission: &ExportSubmission) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut push = |key: &str, value: &str| params.push((key.to_string(), value.to_string()));

    if let Some(token) = &submission.client_token {
        push("ClientToken", token);
    }
    push("Description", &submission.description);
    push("DiskImageFormat", &submission.disk_image_format);
    push("ImageId", &submission.image_id);
    push("RoleName", &submission.role_name);
    push("S3ExportLocation.S3Bucket", &submission.s3_bucket);
    if let Some(prefix) = &submission.s3_prefix {
        push("S3ExportLocation.S3Prefix", prefix);
    }

    if !submission.tags.is_empty() {
        push("TagSpecification.1.ResourceType", TAG_RESOURCE_TYPE);
        for (i, (key, value)) in submission.tags.iter().enumerate() {
            let n = i + 1;
            push(&format!("TagSpecification.1.Tag.{n}.Key"), key);
            push(&format!("TagSpecification.1.Tag.{n}.Value"), value);
        }
    }

    params
}

fn map_transport_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Timeout(err.to_string())
    } else if err.is_connect() {
        ServiceError::ConnectionFailed(err.to_string())
    } else if err.is_decode() {
        ServiceError::InvalidResponse(err.to_string())
    } else {
        // Includes body errors: a connection dropped mid-response
        ServiceError::ConnectionFailed(err.to_string())
    }
}

#[async_trait]
impl CloudExportService for Ec2ExportClient {
    async fn submit_export(&self, submission: &ExportSubmission) -> std::result::Result<TaskId, ServiceError> {
        let body = self
            .call("ExportImage", &export_image_params(submission))
            .await?;
        parse_export_image_response(&body)
    }

    async fn get_export_status(&self, task_id: &TaskId) -> std::result::Result<ExportTask, ServiceError> {
        let params = [("ExportImageTaskId.1".to_string(), task_id.to_string())];
        let body = self.call("DescribeExportImageTasks", &params).await?;
        parse_describe_response(&body, task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn submission() -> ExportSubmission {
        ExportSubmission {
            client_token: None,
            description: "export-1".to_string(),
            disk_image_format: "VMDK".to_string(),
            image_id: "ami-1".to_string(),
            role_name: "vmimport".to_string(),
            s3_bucket: "exports".to_string(),
            s3_prefix: None,
            tags: BTreeMap::new(),
        }
    }

    fn has(params: &[(String, String)], key: &str, value: &str) -> bool {
        params.iter().any(|(k, v)| k == key && v == value)
    }

    #[test]
    fn test_export_image_params_minimal() {
        let params = export_image_params(&submission());

        assert!(has(&params, "Description", "export-1"));
        assert!(has(&params, "DiskImageFormat", "VMDK"));
        assert!(has(&params, "ImageId", "ami-1"));
        assert!(has(&params, "RoleName", "vmimport"));
        assert!(has(&params, "S3ExportLocation.S3Bucket", "exports"));
        assert!(!params.iter().any(|(k, _)| k == "ClientToken"));
        assert!(!params.iter().any(|(k, _)| k == "S3ExportLocation.S3Prefix"));
        assert!(!params.iter().any(|(k, _)| k.starts_with("TagSpecification")));
    }

    #[test]
    fn test_export_image_params_full() {
        let mut sub = submission();
        sub.client_token = Some("tok-1".to_string());
        sub.s3_prefix = Some("images/".to_string());
        sub.tags = BTreeMap::from([
            ("b-team".to_string(), "platform".to_string()),
            ("a-env".to_string(), "prod".to_string()),
        ]);

        let params = export_image_params(&sub);

        assert!(has(&params, "ClientToken", "tok-1"));
        assert!(has(&params, "S3ExportLocation.S3Prefix", "images/"));
        assert!(has(&params, "TagSpecification.1.ResourceType", "export-image-task"));
        // Tags are numbered in key order
        assert!(has(&params, "TagSpecification.1.Tag.1.Key", "a-env"));
        assert!(has(&params, "TagSpecification.1.Tag.1.Value", "prod"));
        assert!(has(&params, "TagSpecification.1.Tag.2.Key", "b-team"));
        assert!(has(&params, "TagSpecification.1.Tag.2.Value", "platform"));
    }

    #[test]
    fn test_new_rejects_endpoint_without_host() {
        let credentials = Credentials {
            access_key_id: "AKID".to_string(),
            secret_access_key: crate::config::secret_string("s".to_string()),
            session_token: None,
        };
        let endpoint = Url::parse("unix:/var/run/ec2.sock").unwrap();
        let result = Ec2ExportClient::new(endpoint, "us-east-1", credentials, Duration::from_secs(5));
        assert!(matches!(result, Err(ExportError::Session(_))));
    }

    fn test_client() -> Ec2ExportClient {
        let credentials = Credentials {
            access_key_id: "AKID".to_string(),
            secret_access_key: crate::config::secret_string("s".to_string()),
            session_token: None,
        };
        let endpoint = Url::parse("http://127.0.0.1:9").unwrap();
        Ec2ExportClient::new(endpoint, "us-east-1", credentials, Duration::from_secs(1)).unwrap()
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn test_call_futures_are_send() {
        let client = test_client();
        let task_id = TaskId::new("export-ami-1").unwrap();
        let sub = submission();

        // Futures are only built, never polled
        assert_send(&client.call("DescribeExportImageTasks", &[]));
        assert_send(&client.submit_export(&sub));
        assert_send(&client.get_export_status(&task_id));
    }
}
