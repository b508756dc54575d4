//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "vmexport.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing vmexport configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your image id and bucket", self.output);
                println!("  2. Provide credentials, either in [access] or via");
                println!("     AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY (a .env file works)");
                println!("  3. Validate configuration: vmexport validate-config");
                println!("  4. Run export: vmexport export");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# vmexport Configuration File

[application]
log_level = "info"
dry_run = false

[access]
region = "us-east-1"

[export]
image_id = "ami-0123456789abcdef0"
disk_image_format = "vmdk"
s3_bucket_name = "my-export-bucket"
s3_bucket_prefix = "exports/"

[polling]
delay_seconds = 15
max_attempts = 240
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# vmexport Configuration File
#
# Exports a machine image to a portable disk image in S3 using the EC2
# image export task API.
#
# Values may reference environment variables as ${VAR_NAME}. Any setting can
# also be overridden with VMEXPORT_<SECTION>_<KEY>, e.g. VMEXPORT_EXPORT_IMAGE_ID.

[application]
# trace | debug | info | warn | error
log_level = "info"
# Validate and log the request without submitting it
dry_run = false

[access]
region = "us-east-1"
# Credentials fall back to AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY and
# AWS_SESSION_TOKEN when not set here.
# access_key = "${AWS_ACCESS_KEY_ID}"
# secret_key = "${AWS_SECRET_ACCESS_KEY}"
# token = "${AWS_SESSION_TOKEN}"
# custom_endpoint_ec2 = "https://ec2.us-east-1.amazonaws.com"
request_timeout_seconds = 30

[export]
# Required
image_id = "ami-0123456789abcdef0"
s3_bucket_name = "my-export-bucket"
# vmdk | raw | vhd (any case)
disk_image_format = "vmdk"

# Optional
s3_bucket_prefix = "exports/"
# {timestamp} is replaced with the submission time in unix seconds
description = "export-{timestamp}"
# IAM role assumed by the export service
role_name = "vmimport"
# Idempotency token; resubmitting with the same token returns the same task
# client_token = "release-2025-01"

[export.tags]
team = "platform"

[polling]
# Delay before each status query; grows by backoff_multiplier up to
# max_delay_seconds. A multiplier of 1.0 polls at a fixed interval.
delay_seconds = 15
max_delay_seconds = 60
backoff_multiplier = 1.0
# Status queries before giving up (0 = unbounded)
max_attempts = 240
# Consecutive transient query errors tolerated
max_poll_errors = 5
# Overall wait deadline in seconds (0 = none)
timeout_seconds = 0

[logging]
local_enabled = false
local_path = "/var/log/vmexport"
# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}
