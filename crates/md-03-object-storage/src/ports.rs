//! The object storage port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageResult;
use crate::keys::ObjectKey;

/// A presigned upload handed to a client, which `PUT`s the bytes itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUpload {
    /// Presigned `PUT` URL
    pub url: String,
    pub key: ObjectKey,
    /// Public URL the object will have once uploaded
    pub file_url: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Presign a `PUT` for `key`.
    async fn presign_upload(&self, key: &ObjectKey) -> StorageResult<PresignedUpload>;

    /// Store `bytes` under `key` and return the public URL.
    async fn put_object(
        &self,
        key: &ObjectKey,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> StorageResult<String>;

    /// Public URL of `key`.
    fn public_url(&self, key: &ObjectKey) -> String;
}
