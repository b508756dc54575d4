//! Session acquisition
//!
//! A [`SessionProvider`] turns configuration into a ready-to-use
//! [`CloudExportService`]. Credentials and region left unset in `[access]`
//! fall back to the standard `AWS_*` environment variables.

use super::client::Ec2ExportClient;
use super::service::CloudExportService;
use super::sigv4::Credentials;
use crate::config::{secret_string, AccessConfig, SecretString};
use crate::domain::errors::ExportError;
use crate::domain::result::Result;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Produces a service handle for one export
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Connects to the export backend
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Session`] when credentials, region or endpoint
    /// cannot be resolved
    async fn connect(&self) -> Result<Arc<dyn CloudExportService>>;
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Session provider for the EC2 export API
pub struct AwsSessionProvider {
    access: AccessConfig,
    env: EnvLookup,
}

impl AwsSessionProvider {
    /// Creates a provider reading fallbacks from the process environment
    pub fn new(access: AccessConfig) -> Self {
        Self::with_env_lookup(access, |key| std::env::var(key).ok())
    }

    /// Creates a provider with a custom environment lookup
    pub fn with_env_lookup<F>(access: AccessConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            access,
            env: Box::new(lookup),
        }
    }

    fn env_var(&self, key: &str) -> Option<String> {
        (self.env)(key).filter(|v| !v.trim().is_empty())
    }

    /// Resolves the region from config, then `AWS_REGION`, then `AWS_DEFAULT_REGION`
    pub fn resolve_region(&self) -> Result<String> {
        self.access
            .region
            .clone()
            .filter(|r| !r.trim().is_empty())
            .or_else(|| self.env_var("AWS_REGION"))
            .or_else(|| self.env_var("AWS_DEFAULT_REGION"))
            .ok_or_else(|| {
                ExportError::Session(
                    "no region configured: set access.region or AWS_REGION".to_string(),
                )
            })
    }

    /// Resolves static credentials from config, then the environment
    pub fn resolve_credentials(&self) -> Result<Credentials> {
        let access_key_id = self
            .access
            .access_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.env_var("AWS_ACCESS_KEY_ID"))
            .ok_or_else(|| {
                ExportError::Session(
                    "no access key configured: set access.access_key or AWS_ACCESS_KEY_ID"
                        .to_string(),
                )
            })?;

        let secret_access_key = non_empty_secret(self.access.secret_key.as_ref())
            .or_else(|| self.env_var("AWS_SECRET_ACCESS_KEY").map(secret_string))
            .ok_or_else(|| {
                ExportError::Session(
                    "no secret key configured: set access.secret_key or AWS_SECRET_ACCESS_KEY"
                        .to_string(),
                )
            })?;

        let session_token = non_empty_secret(self.access.token.as_ref())
            .or_else(|| self.env_var("AWS_SESSION_TOKEN").map(secret_string));

        Ok(Credentials {
            access_key_id,
            secret_access_key,
            session_token,
        })
    }

    /// Resolves the EC2 endpoint, honouring `access.custom_endpoint_ec2`
    pub fn resolve_endpoint(&self, region: &str) -> Result<Url> {
        let raw = match &self.access.custom_endpoint_ec2 {
            Some(endpoint) if !endpoint.trim().is_empty() => endpoint.trim().to_string(),
            _ => format!("https://ec2.{region}.amazonaws.com"),
        };
        Url::parse(&raw)
            .map_err(|e| ExportError::Session(format!("invalid EC2 endpoint '{raw}': {e}")))
    }
}

fn non_empty_secret(secret: Option<&SecretString>) -> Option<SecretString> {
    secret
        .filter(|s| !s.expose_secret().is_empty())
        .cloned()
}

#[async_trait]
impl SessionProvider for AwsSessionProvider {
    async fn connect(&self) -> Result<Arc<dyn CloudExportService>> {
        let region = self.resolve_region()?;
        let credentials = self.resolve_credentials()?;
        let endpoint = self.resolve_endpoint(&region)?;

        tracing::debug!(
            region = %region,
            endpoint = %endpoint,
            temporary_credentials = credentials.session_token.is_some(),
            "Creating EC2 session"
        );

        let client = Ec2ExportClient::new(
            endpoint,
            &region,
            credentials,
            Duration::from_secs(self.access.request_timeout_seconds),
        )?;
        Ok(Arc::new(client))
    }
}
