//! AWS Signature Version 4 request signing
//!
//! Only what the EC2 Query API needs: POST requests with a form-encoded body,
//! an empty query string and the root path.

use crate::config::SecretString;
use chrono::{DateTime, Utc};
use ring::hmac;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Signing credentials
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: SecretString,
    pub session_token: Option<SecretString>,
}

/// Headers to attach to a signed request
#[derive(Debug, Clone, PartialEq)]
pub struct SignedHeaders {
    pub authorization: String,
    pub amz_date: String,
    pub security_token: Option<String>,
}

/// Signs requests for one service in one region
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
    region: String,
    service: String,
}

impl Signer {
    pub fn new(credentials: Credentials, region: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            credentials,
            region: region.into(),
            service: service.into(),
        }
    }

    /// Signs a POST of `body` to `host` at path `/`
    pub fn sign_post(
        &self,
        host: &str,
        content_type: &str,
        body: &str,
        now: DateTime<Utc>,
    ) -> SignedHeaders {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let security_token = self
            .credentials
            .session_token
            .as_ref()
            .map(|t| t.expose_secret().as_ref().to_string());

        // Header names must be lowercase and sorted
        let mut headers = vec![
            ("content-type", content_type.to_string()),
            ("host", host.to_string()),
            ("x-amz-date", amz_date.clone()),
        ];
        if let Some(token) = &security_token {
            headers.push(("x-amz-security-token", token.clone()));
        }

        let canonical_headers: String = headers
            .iter()
            .map(|(name, value)| format!("{name}:{}\n", value.trim()))
            .collect();
        let signed_headers = headers
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(";");

        let canonical_request = format!(
            "POST\n/\n\n{canonical_headers}\n{signed_headers}\n{}",
            sha256_hex(body.as_bytes())
        );

        let scope = format!("{date}/{}/{}/aws4_request", self.region, self.service);
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            sha256_hex(canonical_request.as_bytes())
        );

        let key = signing_key(
            self.credentials.secret_access_key.expose_secret().as_ref(),
            &date,
            &self.region,
            &self.service,
        );
        let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()));

        let authorization = format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            self.credentials.access_key_id
        );

        SignedHeaders {
            authorization,
            amz_date,
            security_token,
        }
    }
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let key = hmac::Key::new(hmac::HMAC_SHA256, key);
    hmac::sign(&key, data).as_ref().to_vec()
}

/// Derives the per-day, per-region, per-service signing key
fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use chrono::TimeZone;

    fn signer(token: Option<&str>) -> Signer {
        Signer::new(
            Credentials {
                access_key_id: "AKIDEXAMPLE".to_string(),
                secret_access_key: secret_string(
                    "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
                ),
                session_token: token.map(|t| secret_string(t.to_string())),
            },
            "us-east-1",
            "ec2",
        )
    }

    #[test]
    fn test_signing_key_derivation() {
        // Published example from the SigV4 documentation
        let key = signing_key(
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            "20120215",
            "us-east-1",
            "iam",
        );
        assert_eq!(
            hex::encode(key),
            "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d"
        );
    }

    #[test]
    fn test_sha256_of_empty_payload() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_authorization_header_shape() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let signed = signer(None).sign_post(
            "ec2.us-east-1.amazonaws.com",
            "application/x-www-form-urlencoded; charset=utf-8",
            "Action=DescribeExportImageTasks&Version=2016-11-15",
            now,
        );

        assert_eq!(signed.amz_date, "20240301T123000Z");
        assert!(signed.security_token.is_none());
        assert!(signed.authorization.starts_with(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240301/us-east-1/ec2/aws4_request, "
        ));
        assert!(signed
            .authorization
            .contains("SignedHeaders=content-type;host;x-amz-date, "));

        let signature = signed.authorization.rsplit("Signature=").next().unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_signature_is_deterministic_and_body_sensitive() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let s = signer(None);
        let a = s.sign_post("host", "ct", "body-a", now);
        let b = s.sign_post("host", "ct", "body-a", now);
        let c = s.sign_post("host", "ct", "body-b", now);

        assert_eq!(a, b);
        assert_ne!(a.authorization, c.authorization);
    }

    #[test]
    fn test_session_token_is_signed() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let signed = signer(Some("FwoGZXIvYXdzE")).sign_post("host", "ct", "", now);

        assert_eq!(signed.security_token.as_deref(), Some("FwoGZXIvYXdzE"));
        assert!(signed
            .authorization
            .contains("SignedHeaders=content-type;host;x-amz-date;x-amz-security-token, "));
    }
}
