//! Configuration schema types
//!
//! The TOML file maps onto [`VmExportConfig`]. The `[export]` section is kept
//! in its raw, unvalidated form ([`RawExportConfig`]) and is turned into an
//! `ExportRequest` by [`crate::config::validator::validate`]; every other
//! section validates itself here.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Longest delay allowed between status queries, in seconds
pub const MAX_POLL_DELAY_SECONDS: u64 = 24 * 60 * 60;

/// Root configuration, one per TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmExportConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Cloud credentials and endpoint
    #[serde(default)]
    pub access: AccessConfig,

    /// Export request parameters, validated separately
    #[serde(default)]
    pub export: RawExportConfig,

    /// Status polling behaviour
    #[serde(default)]
    pub polling: PollingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl VmExportConfig {
    /// Validates every section except `[export]`
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.access.validate()?;
        self.polling.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Validate and log the request without contacting the service
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Cloud credentials and endpoint settings
///
/// Any credential left unset here is resolved from the standard `AWS_*`
/// environment variables when the session is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Region the image lives in
    #[serde(default)]
    pub region: Option<String>,

    /// Access key id
    #[serde(default)]
    pub access_key: Option<String>,

    /// Secret access key
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub secret_key: Option<SecretString>,

    /// Session token for temporary credentials
    #[serde(default)]
    pub token: Option<SecretString>,

    /// Override for the EC2 endpoint URL
    #[serde(default)]
    pub custom_endpoint_ec2: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl AccessConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(endpoint) = &self.custom_endpoint_ec2 {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(
                    "access.custom_endpoint_ec2 must start with http:// or https://".to_string(),
                );
            }
        }

        if self.request_timeout_seconds == 0 {
            return Err("access.request_timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            region: None,
            access_key: None,
            secret_key: None,
            token: None,
            custom_endpoint_ec2: None,
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

/// Raw `[export]` section as written by the user
///
/// Field names match the configuration keys so validation errors can name
/// them directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawExportConfig {
    /// Source image to export
    pub image_id: String,

    /// Target format (VMDK, RAW or VHD, any case)
    pub disk_image_format: String,

    /// Destination bucket
    pub s3_bucket_name: String,

    /// Destination key prefix
    pub s3_bucket_prefix: String,

    /// Description template, `{timestamp}` is rendered at submission
    pub description: String,

    /// Idempotency token for the submission
    pub client_token: String,

    /// IAM role the export service assumes
    pub role_name: String,

    /// Tags applied to the export task
    pub tags: BTreeMap<String, String>,
}

/// Status polling configuration
///
/// The delay before poll `n` (0-based) is
/// `delay_seconds * backoff_multiplier^n`, capped at `max_delay_seconds`.
/// A multiplier of 1.0 gives a fixed interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Delay before the first status query, in seconds
    #[serde(default = "default_delay_seconds")]
    pub delay_seconds: u64,

    /// Upper bound for the delay between queries, in seconds
    #[serde(default = "default_max_delay_seconds")]
    pub max_delay_seconds: u64,

    /// Growth factor applied to the delay after each query
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Maximum number of status queries (0 = unbounded)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Consecutive transient query errors tolerated before giving up
    #[serde(default = "default_max_poll_errors")]
    pub max_poll_errors: u32,

    /// Overall wait deadline in seconds (0 = none)
    #[serde(default)]
    pub timeout_seconds: u64,
}

impl PollingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.backoff_multiplier < 1.0 || !self.backoff_multiplier.is_finite() {
            return Err(format!(
                "polling.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }

        if self.max_delay_seconds < self.delay_seconds {
            return Err(format!(
                "polling.max_delay_seconds ({}) must be >= polling.delay_seconds ({})",
                self.max_delay_seconds, self.delay_seconds
            ));
        }

        if self.max_delay_seconds > MAX_POLL_DELAY_SECONDS {
            return Err(format!(
                "polling.max_delay_seconds must be <= {MAX_POLL_DELAY_SECONDS}, got {}",
                self.max_delay_seconds
            ));
        }

        if self.max_poll_errors == 0 {
            return Err("polling.max_poll_errors must be > 0".to_string());
        }

        Ok(())
    }

    /// Delay to wait before the status query with the given 0-based index
    ///
    /// Never exceeds [`MAX_POLL_DELAY_SECONDS`], even for unvalidated values.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let cap = self.max_delay_seconds.min(MAX_POLL_DELAY_SECONDS);
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay = self.delay_seconds as f64 * self.backoff_multiplier.powi(exponent);
        let delay = delay.min(cap as f64);
        Duration::try_from_secs_f64(delay.max(0.0)).unwrap_or(Duration::from_secs(cap))
    }

    /// Overall deadline, if configured
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            delay_seconds: default_delay_seconds(),
            max_delay_seconds: default_max_delay_seconds(),
            backoff_multiplier: default_backoff_multiplier(),
            max_attempts: default_max_attempts(),
            max_poll_errors: default_max_poll_errors(),
            timeout_seconds: 0,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    30
}

fn default_delay_seconds() -> u64 {
    15
}

fn default_max_delay_seconds() -> u64 {
    60
}

fn default_backoff_multiplier() -> f64 {
    1.0
}

fn default_max_attempts() -> u32 {
    240
}

fn default_max_poll_errors() -> u32 {
    5
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
