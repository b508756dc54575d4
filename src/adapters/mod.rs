//! External system integrations for vmexport.
//!
//! - [`aws`] - EC2 image export (Query API, SigV4, session resolution)
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with mock implementations. The orchestrator depends only on
//! the [`aws::CloudExportService`] and [`aws::SessionProvider`] traits.
//!
//! ```rust,no_run
//! use vmexport::adapters::aws::{AwsSessionProvider, SessionProvider};
//! use vmexport::config::AccessConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let access = AccessConfig {
//!     region: Some("us-east-1".to_string()),
//!     ..Default::default()
//! };
//!
//! // Credentials fall back to AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY
//! let service = AwsSessionProvider::new(access).connect().await?;
//! # Ok(())
//! # }
//! ```

pub mod aws;
