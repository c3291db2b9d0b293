//! Bucket settings.

use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};
use crate::sigv4::{Credentials, DEFAULT_EXPIRY_SECS, MAX_EXPIRY_SECS};

/// Where objects go and how long presigned URLs live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    #[serde(skip_serializing)]
    pub secret_access_key: String,
    #[serde(skip_serializing)]
    pub session_token: Option<String>,
    /// Custom endpoint (e.g. `http://127.0.0.1:9000`), addressed path-style.
    pub endpoint: Option<String>,
    pub presign_expiry_secs: u64,
    pub upload_timeout_secs: u64,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: "us-east-1".to_string(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            session_token: None,
            endpoint: None,
            presign_expiry_secs: DEFAULT_EXPIRY_SECS,
            upload_timeout_secs: 30,
        }
    }
}

impl S3Config {
    pub fn validate(&self) -> StorageResult<()> {
        if self.bucket.trim().is_empty() {
            return Err(StorageError::Config("bucket name is empty".into()));
        }
        if self.region.trim().is_empty() {
            return Err(StorageError::Config("region is empty".into()));
        }
        if self.access_key_id.is_empty() || self.secret_access_key.is_empty() {
            return Err(StorageError::Config("access key pair is incomplete".into()));
        }
        if self.presign_expiry_secs == 0 || self.presign_expiry_secs > MAX_EXPIRY_SECS {
            return Err(StorageError::InvalidExpiry {
                secs: self.presign_expiry_secs,
                max: MAX_EXPIRY_SECS,
            });
        }
        if let Some(endpoint) = &self.endpoint {
            if split_endpoint(endpoint).is_none() {
                return Err(StorageError::Config(format!("bad endpoint: {}", endpoint)));
            }
        }
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            session_token: self.session_token.clone(),
        }
    }

    /// `(scheme, host, path prefix)` for objects in this bucket.
    pub(crate) fn addressing(&self) -> (String, String, String) {
        match self.endpoint.as_deref().and_then(split_endpoint) {
            Some((scheme, host)) => (scheme.to_string(), host.to_string(), format!("/{}", self.bucket)),
            None => (
                "https".to_string(),
                format!("{}.s3.{}.amazonaws.com", self.bucket, self.region),
                String::new(),
            ),
        }
    }
}

fn split_endpoint(endpoint: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = endpoint.split_once("://")?;
    if scheme != "http" && scheme != "https" {
        return None;
    }
    let host = rest.trim_end_matches('/');
    if host.is_empty() || host.contains('/') {
        return None;
    }
    Some((scheme, host))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> S3Config {
        S3Config {
            bucket: "media".into(),
            region: "ap-northeast-2".into(),
            access_key_id: "AKID".into(),
            secret_access_key: "secret".into(),
            ..S3Config::default()
        }
    }

    #[test]
    fn test_virtual_hosted_addressing() {
        let (scheme, host, prefix) = config().addressing();
        assert_eq!(scheme, "https");
        assert_eq!(host, "media.s3.ap-northeast-2.amazonaws.com");
        assert_eq!(prefix, "");
    }

    #[test]
    fn test_endpoint_override_is_path_style() {
        let mut config = config();
        config.endpoint = Some("http://127.0.0.1:9000/".into());
        assert!(config.validate().is_ok());
        let (scheme, host, prefix) = config.addressing();
        assert_eq!((scheme.as_str(), host.as_str(), prefix.as_str()), ("http", "127.0.0.1:9000", "/media"));
    }

    #[test]
    fn test_validate_rejects_incomplete() {
        assert!(config().validate().is_ok());
        assert!(S3Config::default().validate().is_err());

        let mut bad = config();
        bad.endpoint = Some("ftp://x".into());
        assert!(bad.validate().is_err());

        let mut bad = config();
        bad.presign_expiry_secs = 0;
        assert!(bad.validate().is_err());
    }
}
