//! Credential strings held in memory
//!
//! Cloud credentials from the `[access]` section are wrapped in
//! `secrecy::Secret` so they are zeroed on drop, print as `[REDACTED]` in
//! `Debug` output, and must be read explicitly with `expose_secret()`.
//!
//! # Example
//!
//! ```rust
//! use vmexport::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let secret_key = secret_string("wJalrXUtnFEMI/K7MDENG".to_string());
//! assert_eq!(secret_key.expose_secret().as_ref(), "wJalrXUtnFEMI/K7MDENG");
//! assert!(!format!("{secret_key:?}").contains("wJalr"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String newtype implementing the marker traits `Secret` needs
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// A zeroize-on-drop, redacted-in-Debug string
pub type SecretString = Secret<SecretValue>;

/// Wraps a plain string as a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Wraps an optional plain string, treating empty strings as absent
///
/// ```rust
/// use vmexport::config::secret_string_opt;
///
/// assert!(secret_string_opt(Some("token".to_string())).is_some());
/// assert!(secret_string_opt(Some(String::new())).is_none());
/// assert!(secret_string_opt(None).is_none());
/// ```
#[inline]
pub fn secret_string_opt(value: Option<String>) -> Option<SecretString> {
    value
        .filter(|s| !s.is_empty())
        .map(|s| Secret::new(SecretValue::from(s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("AKIDEXAMPLE".to_string());
        assert_eq!(secret.expose_secret(), "AKIDEXAMPLE");
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("wJalrXUtnFEMI".to_string());
        let debug_output = format!("{secret:?}");

        assert!(!debug_output.contains("wJalrXUtnFEMI"));
        assert!(debug_output.contains("REDACTED"));
    }

    #[test]
    fn test_secret_toml_deserialize() {
        #[derive(Deserialize)]
        struct Access {
            secret_key: SecretString,
        }

        let access: Access = toml::from_str("secret_key = \"s3cr3t\"").unwrap();
        assert_eq!(access.secret_key.expose_secret(), "s3cr3t");
    }
}
