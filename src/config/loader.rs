//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::VmExportConfig;
use crate::domain::errors::ExportError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into VmExportConfig
/// 4. Applies environment variable overrides (VMEXPORT_* prefix, plus the
///    AWS_POLL_DELAY_SECONDS / AWS_MAX_ATTEMPTS polling overrides)
/// 5. Validates every section except `[export]`, which is validated as a
///    whole by [`crate::config::validator::validate`]
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - A section fails validation
///
/// # Examples
///
/// ```no_run
/// use vmexport::config::loader::load_config;
///
/// let config = load_config("vmexport.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<VmExportConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ExportError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ExportError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text, applying the same substitution,
/// overrides and validation as [`load_config`]
pub fn parse_config(contents: &str) -> Result<VmExportConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: VmExportConfig = toml::from_str(&contents)
        .map_err(|e| ExportError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        ExportError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. All missing variables are reported at
/// once.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ExportError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ExportError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides
///
/// Variables follow the pattern `VMEXPORT_<SECTION>_<KEY>`, for example
/// `VMEXPORT_EXPORT_IMAGE_ID`. The polling section additionally honours
/// `AWS_POLL_DELAY_SECONDS` and `AWS_MAX_ATTEMPTS`, logging a warning when
/// they take effect since they silently change how long an export waits.
fn apply_env_overrides(config: &mut VmExportConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("VMEXPORT_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("VMEXPORT_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Access overrides
    if let Ok(val) = std::env::var("VMEXPORT_ACCESS_REGION") {
        config.access.region = Some(val);
    }
    if let Ok(val) = std::env::var("VMEXPORT_ACCESS_CUSTOM_ENDPOINT_EC2") {
        config.access.custom_endpoint_ec2 = Some(val);
    }

    // Export overrides
    if let Ok(val) = std::env::var("VMEXPORT_EXPORT_IMAGE_ID") {
        config.export.image_id = val;
    }
    if let Ok(val) = std::env::var("VMEXPORT_EXPORT_DISK_IMAGE_FORMAT") {
        config.export.disk_image_format = val;
    }
    if let Ok(val) = std::env::var("VMEXPORT_EXPORT_S3_BUCKET_NAME") {
        config.export.s3_bucket_name = val;
    }
    if let Ok(val) = std::env::var("VMEXPORT_EXPORT_S3_BUCKET_PREFIX") {
        config.export.s3_bucket_prefix = val;
    }
    if let Ok(val) = std::env::var("VMEXPORT_EXPORT_ROLE_NAME") {
        config.export.role_name = val;
    }
    if let Ok(val) = std::env::var("VMEXPORT_EXPORT_CLIENT_TOKEN") {
        config.export.client_token = val;
    }

    // Polling overrides
    if let Ok(val) = std::env::var("AWS_POLL_DELAY_SECONDS") {
        if let Ok(delay) = val.parse::<u64>() {
            tracing::warn!(
                delay_seconds = delay,
                "AWS_POLL_DELAY_SECONDS is set, overriding polling.delay_seconds"
            );
            config.polling.delay_seconds = delay;
            config.polling.max_delay_seconds = config.polling.max_delay_seconds.max(delay);
        }
    }
    if let Ok(val) = std::env::var("AWS_MAX_ATTEMPTS") {
        if let Ok(attempts) = val.parse::<u32>() {
            tracing::warn!(
                max_attempts = attempts,
                "AWS_MAX_ATTEMPTS is set, overriding polling.max_attempts"
            );
            config.polling.max_attempts = attempts;
        }
    }
    if let Ok(val) = std::env::var("VMEXPORT_POLLING_MAX_POLL_ERRORS") {
        if let Ok(errors) = val.parse() {
            config.polling.max_poll_errors = errors;
        }
    }
    if let Ok(val) = std::env::var("VMEXPORT_POLLING_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.polling.timeout_seconds = timeout;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("VMEXPORT_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("VMEXPORT_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("VMEXPORT_LOADER_TEST_VAR", "test_value");
        let input = "secret_key = \"${VMEXPORT_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "secret_key = \"test_value\"\n");
        std::env::remove_var("VMEXPORT_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing_reports_all() {
        std::env::remove_var("VMEXPORT_MISSING_A");
        std::env::remove_var("VMEXPORT_MISSING_B");
        let input = "a = \"${VMEXPORT_MISSING_A}\"\nb = \"${VMEXPORT_MISSING_B}\"";
        let err = substitute_env_vars(input).unwrap_err().to_string();
        assert!(err.contains("VMEXPORT_MISSING_A"));
        assert!(err.contains("VMEXPORT_MISSING_B"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("VMEXPORT_COMMENTED_OUT");
        let input = "# token = \"${VMEXPORT_COMMENTED_OUT}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(ExportError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[access]
region = "eu-west-1"

[export]
image_id = "ami-0123456789abcdef0"
disk_image_format = "vhd"
s3_bucket_name = "exports"

[polling]
delay_seconds = 5
max_delay_seconds = 30
backoff_multiplier = 2.0
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.access.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.export.image_id, "ami-0123456789abcdef0");
        assert_eq!(config.polling.delay_seconds, 5);
        assert_eq!(config.polling.backoff_multiplier, 2.0);
    }

    #[test]
    fn test_parse_config_rejects_invalid_section() {
        let result = parse_config("[polling]\nbackoff_multiplier = 0.1\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("backoff_multiplier"));
    }

    #[test]
    fn test_parse_config_invalid_toml() {
        let result = parse_config("[export\nimage_id = ");
        assert!(matches!(result, Err(ExportError::Configuration(_))));
    }
}
