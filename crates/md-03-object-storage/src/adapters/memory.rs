//! Process-local object store for tests and local development.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::StorageResult;
use crate::keys::ObjectKey;
use crate::ports::{ObjectStorage, PresignedUpload};
use crate::sigv4::DEFAULT_EXPIRY_SECS;

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Objects kept in a map. URLs point at `base_url`.
#[derive(Debug)]
pub struct InMemoryObjectStorage {
    base_url: String,
    objects: RwLock<HashMap<ObjectKey, StoredObject>>,
}

impl Default for InMemoryObjectStorage {
    fn default() -> Self {
        Self::new("memory://objects")
    }
}

impl InMemoryObjectStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &ObjectKey) -> Option<StoredObject> {
        self.objects.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn presign_upload(&self, key: &ObjectKey) -> StorageResult<PresignedUpload> {
        let lifetime = Duration::seconds(DEFAULT_EXPIRY_SECS as i64);
        Ok(PresignedUpload {
            url: format!("{}?upload=1", self.public_url(key)),
            key: key.clone(),
            file_url: self.public_url(key),
            expires_at: Utc::now() + lifetime,
        })
    }

    async fn put_object(
        &self,
        key: &ObjectKey,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> StorageResult<String> {
        self.objects.write().insert(
            key.clone(),
            StoredObject {
                bytes,
                content_type: content_type.map(str::to_owned),
            },
        );
        Ok(self.public_url(key))
    }

    fn public_url(&self, key: &ObjectKey) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::profile_image_key;

    #[tokio::test]
    async fn test_put_then_get() {
        let store = InMemoryObjectStorage::new("http://files.local/");
        let key = profile_image_key("a.png", 7).unwrap();
        let url = store
            .put_object(&key, vec![1, 2, 3], Some("image/png"))
            .await
            .unwrap();
        assert_eq!(url, "http://files.local/profiles/7-a.png");
        assert_eq!(store.get(&key).unwrap().content_type.as_deref(), Some("image/png"));
        assert_eq!(store.len(), 1);
    }
}
