//! S3-compatible store over presigned `PUT`s.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::{header, Client};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::S3Config;
use crate::error::{StorageError, StorageResult};
use crate::keys::ObjectKey;
use crate::ports::{ObjectStorage, PresignedUpload};
use crate::sigv4::{self, canonical_uri, PresignRequest};

/// Bucket client. Uploads sign a short-lived URL and `PUT` to it, so only
/// one signing path exists.
#[derive(Debug, Clone)]
pub struct S3ObjectStorage {
    config: S3Config,
    client: Client,
}

impl S3ObjectStorage {
    pub fn new(config: S3Config) -> StorageResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.upload_timeout_secs))
            .build()
            .map_err(|e| StorageError::Config(format!("failed to build HTTP client: {}", e)))?;
        info!(bucket = %config.bucket, region = %config.region, "object storage ready");
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// Presign `method` on `key` as of `now`.
    pub fn presign_at(
        &self,
        method: &str,
        key: &ObjectKey,
        now: DateTime<Utc>,
    ) -> StorageResult<PresignedUpload> {
        let (scheme, host, prefix) = self.config.addressing();
        let request = PresignRequest {
            method: method.to_string(),
            scheme,
            host,
            path: format!("{}/{}", prefix, key),
            region: self.config.region.clone(),
            service: "s3".to_string(),
            expires_secs: self.config.presign_expiry_secs,
        };
        let url = sigv4::presign(&request, &self.config.credentials(), now)?;
        let lifetime = i64::try_from(self.config.presign_expiry_secs).unwrap_or(i64::MAX);
        Ok(PresignedUpload {
            url,
            key: key.clone(),
            file_url: self.public_url(key),
            expires_at: now + ChronoDuration::seconds(lifetime),
        })
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn presign_upload(&self, key: &ObjectKey) -> StorageResult<PresignedUpload> {
        let upload = self.presign_at("PUT", key, Utc::now())?;
        debug!(key = %key, expires_at = %upload.expires_at, "presigned upload");
        Ok(upload)
    }

    async fn put_object(
        &self,
        key: &ObjectKey,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> StorageResult<String> {
        let upload = self.presign_at("PUT", key, Utc::now())?;
        let size = bytes.len();
        let mut request = self.client.put(&upload.url).body(bytes);
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(key = %key, status = status.as_u16(), "object upload rejected");
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        info!(key = %key, size, "object uploaded");
        Ok(upload.file_url)
    }

    fn public_url(&self, key: &ObjectKey) -> String {
        let (scheme, host, prefix) = self.config.addressing();
        format!(
            "{}://{}{}",
            scheme,
            host,
            canonical_uri(&format!("{}/{}", prefix, key))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::profile_image_key;
    use chrono::TimeZone;

    fn storage() -> S3ObjectStorage {
        S3ObjectStorage::new(S3Config {
            bucket: "media".into(),
            region: "ap-northeast-2".into(),
            access_key_id: "AKID".into(),
            secret_access_key: "secret".into(),
            ..S3Config::default()
        })
        .unwrap()
    }

    #[test]
    fn test_presign_at_shape() {
        let key = profile_image_key("me.png", 1).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let upload = storage().presign_at("PUT", &key, now).unwrap();

        assert!(upload
            .url
            .starts_with("https://media.s3.ap-northeast-2.amazonaws.com/profiles/1-me.png?"));
        assert!(upload.url.contains("X-Amz-Expires=3600"));
        assert!(upload.url.contains("X-Amz-Signature="));
        assert_eq!(
            upload.file_url,
            "https://media.s3.ap-northeast-2.amazonaws.com/profiles/1-me.png"
        );
        assert_eq!(upload.expires_at, now + ChronoDuration::seconds(3600));
    }

    #[test]
    fn test_public_url_encodes_key() {
        let key = profile_image_key("my photo.png", 5).unwrap();
        assert!(storage().public_url(&key).ends_with("/profiles/5-my%20photo.png"));
    }
}
