//! Configuration management for vmexport.
//!
//! # Overview
//!
//! vmexport uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Default values for optional settings
//! - `VMEXPORT_<SECTION>_<KEY>` environment overrides
//! - An accumulating validator for the export request itself
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use vmexport::config::{load_config, validator};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("vmexport.toml")?;
//! let request = validator::validate(&config.export)?;
//!
//! println!("Exporting {} as {}", request.image_id(), request.disk_image_format());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run mode
//! - [`AccessConfig`] - Region, credentials, endpoint
//! - [`RawExportConfig`] - Export request parameters
//! - [`PollingConfig`] - Delay, backoff, attempt budgets
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [access]
//! region = "us-east-1"
//! access_key = "${AWS_ACCESS_KEY_ID}"
//! secret_key = "${AWS_SECRET_ACCESS_KEY}"
//!
//! [export]
//! image_id = "ami-0123456789abcdef0"
//! disk_image_format = "vmdk"
//! s3_bucket_name = "exports"
//! s3_bucket_prefix = "images/"
//!
//! [export.tags]
//! team = "platform"
//!
//! [polling]
//! delay_seconds = 15
//! max_attempts = 240
//! ```

pub mod loader;
pub mod schema;
pub mod secret;
pub mod validator;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    AccessConfig, ApplicationConfig, LoggingConfig, PollingConfig, RawExportConfig,
    VmExportConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
pub use validator::validate;
