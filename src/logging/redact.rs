//! Secret filtering for log output
//!
//! Anything describing the configuration is passed through a [`SecretFilter`]
//! before it is logged. The filter is handed to the orchestrator explicitly
//! so tests can swap in [`NoopFilter`].

use crate::config::AccessConfig;
use secrecy::ExposeSecret;

/// Replacement text for redacted values
pub const REDACTED: &str = "<sensitive>";

/// Removes registered secret values from text before it is logged
pub trait SecretFilter: Send + Sync {
    /// Returns `input` with every registered secret replaced
    fn redact(&self, input: &str) -> String;
}

/// Filter that replaces each registered secret with [`REDACTED`]
///
/// # Example
///
/// ```
/// use vmexport::logging::{RedactingFilter, SecretFilter};
///
/// let filter = RedactingFilter::new(["AKIDEXAMPLE"]);
/// assert_eq!(filter.redact("key=AKIDEXAMPLE"), "key=<sensitive>");
/// ```
#[derive(Clone, Default)]
pub struct RedactingFilter {
    secrets: Vec<String>,
}

impl RedactingFilter {
    /// Creates a filter for the given secrets, ignoring empty values
    pub fn new<I, S>(secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut secrets: Vec<String> = secrets
            .into_iter()
            .map(Into::into)
            .filter(|s| !s.is_empty())
            .collect();
        // Longest first so a secret containing another is replaced whole
        secrets.sort_by_key(|s| std::cmp::Reverse(s.len()));
        secrets.dedup();
        Self { secrets }
    }

    /// Registers the access key, secret key and session token of `access`
    pub fn from_access(access: &AccessConfig) -> Self {
        let mut secrets = Vec::new();
        if let Some(key) = &access.access_key {
            secrets.push(key.clone());
        }
        if let Some(secret) = &access.secret_key {
            secrets.push(secret.expose_secret().as_ref().to_string());
        }
        if let Some(token) = &access.token {
            secrets.push(token.expose_secret().as_ref().to_string());
        }
        Self::new(secrets)
    }

    /// Number of registered secrets
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

impl SecretFilter for RedactingFilter {
    fn redact(&self, input: &str) -> String {
        self.secrets
            .iter()
            .fold(input.to_string(), |acc, secret| acc.replace(secret, REDACTED))
    }
}

// Secrets must never show up through Debug either
impl std::fmt::Debug for RedactingFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedactingFilter")
            .field("secrets", &self.secrets.len())
            .finish()
    }
}

/// Filter that passes text through unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFilter;

impl SecretFilter for NoopFilter {
    fn redact(&self, input: &str) -> String {
        input.to_string()
    }
}
