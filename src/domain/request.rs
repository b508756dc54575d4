//! Validated export request
//!
//! An [`ExportRequest`] can only be produced by
//! [`crate::config::validator::validate`], so holding one means every
//! validation rule has passed.

use super::ids::ImageId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Default description template, `{timestamp}` is rendered at submission time
pub const DEFAULT_DESCRIPTION: &str = "export-{timestamp}";

/// Default IAM role delegated to the export service
pub const DEFAULT_ROLE_NAME: &str = "vmimport";

/// Placeholder replaced by the unix timestamp in descriptions
const TIMESTAMP_PLACEHOLDER: &str = "{timestamp}";

/// Target disk image format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiskImageFormat {
    /// VMware virtual disk
    Vmdk,
    /// Raw disk image
    Raw,
    /// Microsoft virtual hard disk
    Vhd,
}

impl DiskImageFormat {
    /// All supported formats, in the order they are reported to users
    pub const ALL: [DiskImageFormat; 3] = [Self::Vmdk, Self::Raw, Self::Vhd];

    /// Upper-case wire name used by the export API
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vmdk => "VMDK",
            Self::Raw => "RAW",
            Self::Vhd => "VHD",
        }
    }

    /// File extension of the exported object
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Vmdk => "vmdk",
            Self::Raw => "raw",
            Self::Vhd => "vhd",
        }
    }

    /// Comma separated list of the allowed names, for error messages
    pub fn allowed() -> String {
        Self::ALL
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for DiskImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiskImageFormat {
    type Err = String;

    /// Parses a format name case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "VMDK" => Ok(Self::Vmdk),
            "RAW" => Ok(Self::Raw),
            "VHD" => Ok(Self::Vhd),
            _ => Err(format!(
                "invalid disk image format '{}'. Must be one of: {}",
                s,
                Self::allowed()
            )),
        }
    }
}

/// Destination of the exported image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Destination {
    /// Bucket name
    pub bucket: String,

    /// Key prefix the service prepends to the exported object
    pub prefix: Option<String>,
}

/// The validated, immutable description of one export operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRequest {
    image_id: ImageId,
    disk_image_format: DiskImageFormat,
    destination: S3Destination,
    description: String,
    client_token: Option<String>,
    role_name: String,
    tags: BTreeMap<String, String>,
}

impl ExportRequest {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        image_id: ImageId,
        disk_image_format: DiskImageFormat,
        destination: S3Destination,
        description: String,
        client_token: Option<String>,
        role_name: String,
        tags: BTreeMap<String, String>,
    ) -> Self {
        Self {
            image_id,
            disk_image_format,
            destination,
            description,
            client_token,
            role_name,
            tags,
        }
    }

    pub fn image_id(&self) -> &ImageId {
        &self.image_id
    }

    pub fn disk_image_format(&self) -> DiskImageFormat {
        self.disk_image_format
    }

    pub fn destination(&self) -> &S3Destination {
        &self.destination
    }

    /// Description template as configured (placeholders unrendered)
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn client_token(&self) -> Option<&str> {
        self.client_token.as_deref()
    }

    pub fn role_name(&self) -> &str {
        &self.role_name
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Renders the description template for a submission made at `now`
    ///
    /// `{timestamp}` becomes the unix timestamp in seconds.
    ///
    /// # Example
    ///
    /// ```
    /// use vmexport::config::validator::validate;
    /// use vmexport::config::schema::RawExportConfig;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let raw = RawExportConfig {
    ///     image_id: "ami-1".to_string(),
    ///     s3_bucket_name: "bucket".to_string(),
    ///     disk_image_format: "vmdk".to_string(),
    ///     ..Default::default()
    /// };
    /// let request = validate(&raw).unwrap();
    /// let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    /// assert_eq!(request.render_description(now), "export-1700000000");
    /// ```
    pub fn render_description(&self, now: DateTime<Utc>) -> String {
        self.description
            .replace(TIMESTAMP_PLACEHOLDER, &now.timestamp().to_string())
    }
}
