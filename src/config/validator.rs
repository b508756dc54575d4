//! Export request validation
//!
//! Turns the raw `[export]` section into an [`ExportRequest`]. Every rule is
//! evaluated and all failures are returned together, so a user fixing a
//! configuration sees every problem in one report.

use super::schema::RawExportConfig;
use crate::domain::errors::{FieldError, ValidationErrors};
use crate::domain::ids::ImageId;
use crate::domain::request::{
    DiskImageFormat, ExportRequest, S3Destination, DEFAULT_DESCRIPTION, DEFAULT_ROLE_NAME,
};

/// Validates and normalizes the raw export parameters
///
/// Rules, reported in this order:
/// 1. `image_id` must be non-empty
/// 2. `s3_bucket_name` must be non-empty
/// 3. `disk_image_format`, upper-cased, must be one of VMDK, RAW, VHD
///
/// Defaults are applied only to empty fields: `description` becomes
/// `export-{timestamp}` and `role_name` becomes `vmimport`.
///
/// No network access and no logging happen here.
///
/// # Example
///
/// ```
/// use vmexport::config::schema::RawExportConfig;
/// use vmexport::config::validator::validate;
///
/// let errors = validate(&RawExportConfig::default()).unwrap_err();
/// assert_eq!(errors.fields(), vec!["image_id", "s3_bucket_name", "disk_image_format"]);
/// ```
pub fn validate(raw: &RawExportConfig) -> Result<ExportRequest, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let image_id = match ImageId::new(raw.image_id.as_str()) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(missing("image_id"));
            None
        }
    };

    let bucket = non_empty(&raw.s3_bucket_name);
    if bucket.is_none() {
        errors.push(missing("s3_bucket_name"));
    }

    let format = match raw.disk_image_format.parse::<DiskImageFormat>() {
        Ok(format) => Some(format),
        Err(message) => {
            errors.push(FieldError::new("disk_image_format", message));
            None
        }
    };

    match (image_id, bucket, format) {
        (Some(image_id), Some(bucket), Some(format)) if errors.is_empty() => {
            let description = non_empty(&raw.description)
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
            let role_name =
                non_empty(&raw.role_name).unwrap_or_else(|| DEFAULT_ROLE_NAME.to_string());

            Ok(ExportRequest::new(
                image_id,
                format,
                S3Destination {
                    bucket,
                    prefix: non_empty(&raw.s3_bucket_prefix),
                },
                description,
                non_empty(&raw.client_token),
                role_name,
                raw.tags.clone(),
            ))
        }
        _ => Err(errors),
    }
}

fn missing(field: &str) -> FieldError {
    FieldError::new(field, format!("no value provided for {field}"))
}

/// Whitespace-only counts as unset; a set value is kept verbatim
fn non_empty(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use test_case::test_case;

    fn valid_raw() -> RawExportConfig {
        RawExportConfig {
            image_id: "ami-0123456789abcdef0".to_string(),
            disk_image_format: "vmdk".to_string(),
            s3_bucket_name: "exports".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config_applies_defaults() {
        let request = validate(&valid_raw()).unwrap();

        assert_eq!(request.image_id().as_str(), "ami-0123456789abcdef0");
        assert_eq!(request.disk_image_format(), DiskImageFormat::Vmdk);
        assert_eq!(request.destination().bucket, "exports");
        assert_eq!(request.destination().prefix, None);
        assert_eq!(request.description(), "export-{timestamp}");
        assert_eq!(request.role_name(), "vmimport");
        assert_eq!(request.client_token(), None);
        assert!(request.tags().is_empty());
    }

    #[test]
    fn test_missing_both_required_fields_reports_two_errors() {
        let raw = RawExportConfig {
            disk_image_format: "RAW".to_string(),
            ..Default::default()
        };

        let errors = validate(&raw).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.fields(), vec!["image_id", "s3_bucket_name"]);
    }

    #[test]
    fn test_whitespace_only_required_field_is_missing() {
        let mut raw = valid_raw();
        raw.s3_bucket_name = "   ".to_string();

        let errors = validate(&raw).unwrap_err();
        assert_eq!(errors.fields(), vec!["s3_bucket_name"]);
    }

    #[test_case("vmdk", DiskImageFormat::Vmdk ; "lower vmdk")]
    #[test_case("VmDk", DiskImageFormat::Vmdk ; "mixed vmdk")]
    #[test_case("raw", DiskImageFormat::Raw ; "lower raw")]
    #[test_case("RAW", DiskImageFormat::Raw ; "upper raw")]
    #[test_case("vHd", DiskImageFormat::Vhd ; "mixed vhd")]
    #[test_case("VHD", DiskImageFormat::Vhd ; "upper vhd")]
    fn test_disk_format_case_normalized(input: &str, expected: DiskImageFormat) {
        let mut raw = valid_raw();
        raw.disk_image_format = input.to_string();

        let request = validate(&raw).unwrap();
        assert_eq!(request.disk_image_format(), expected);
    }

    #[test_case("qcow2" ; "other format")]
    #[test_case("vmdk2" ; "near miss")]
    #[test_case("" ; "empty")]
    fn test_disk_format_rejected_names_value(input: &str) {
        let mut raw = valid_raw();
        raw.disk_image_format = input.to_string();

        let errors = validate(&raw).unwrap_err();
        assert_eq!(errors.len(), 1);
        let error = errors.iter().next().unwrap();
        assert_eq!(error.field, "disk_image_format");
        assert!(error.message.contains(&format!("'{input}'")));
        assert!(error.message.contains("VMDK, RAW, VHD"));
    }

    #[test]
    fn test_all_rules_evaluated_together() {
        let raw = RawExportConfig {
            disk_image_format: "ova".to_string(),
            ..Default::default()
        };

        let errors = validate(&raw).unwrap_err();
        assert_eq!(
            errors.fields(),
            vec!["image_id", "s3_bucket_name", "disk_image_format"]
        );
    }

    #[test]
    fn test_explicit_role_name_is_kept() {
        let mut raw = valid_raw();
        raw.role_name = "custom".to_string();

        let request = validate(&raw).unwrap();
        assert_eq!(request.role_name(), "custom");
    }

    #[test]
    fn test_explicit_description_is_kept() {
        let mut raw = valid_raw();
        raw.description = "golden image {timestamp}".to_string();

        let request = validate(&raw).unwrap();
        assert_eq!(request.description(), "golden image {timestamp}");
    }

    #[test]
    fn test_optional_fields_carried_over() {
        let mut raw = valid_raw();
        raw.s3_bucket_prefix = "images/".to_string();
        raw.client_token = "token-123".to_string();
        raw.tags = BTreeMap::from([("team".to_string(), "platform".to_string())]);

        let request = validate(&raw).unwrap();
        assert_eq!(request.destination().prefix.as_deref(), Some("images/"));
        assert_eq!(request.client_token(), Some("token-123"));
        assert_eq!(request.tags().get("team").map(String::as_str), Some("platform"));
    }

    #[test]
    fn test_explicit_values_are_not_trimmed() {
        let mut raw = valid_raw();
        raw.description = " nightly {timestamp} ".to_string();
        raw.s3_bucket_prefix = "images/ ".to_string();
        raw.client_token = " token-123".to_string();

        let request = validate(&raw).unwrap();
        assert_eq!(request.description(), " nightly {timestamp} ");
        assert_eq!(request.destination().prefix.as_deref(), Some("images/ "));
        assert_eq!(request.client_token(), Some(" token-123"));
    }

    #[test]
    fn test_whitespace_only_optional_fields_take_defaults() {
        let mut raw = valid_raw();
        raw.description = "  ".to_string();
        raw.role_name = "\t".to_string();
        raw.s3_bucket_prefix = " ".to_string();

        let request = validate(&raw).unwrap();
        assert_eq!(request.description(), "export-{timestamp}");
        assert_eq!(request.role_name(), "vmimport");
        assert_eq!(request.destination().prefix, None);
    }
}
