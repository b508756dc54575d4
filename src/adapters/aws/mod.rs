//! EC2 image export adapter
//!
//! This module provides the integration with the EC2 image export API:
//! the service contract, session acquisition, SigV4 signing, the HTTP client
//! and its response models.

pub mod client;
pub mod models;
pub mod service;
pub mod session;
pub mod sigv4;

pub use client::Ec2ExportClient;
pub use service::{CloudExportService, ExportSubmission};
pub use session::{AwsSessionProvider, SessionProvider};
pub use sigv4::{Credentials, Signer};
