//! Object key construction.
//!
//! Client-supplied names never become keys verbatim: the file name is cut to
//! its last path component and prefixed with something unique, and folders
//! are restricted to a conservative alphabet.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};

/// Folder used when the caller names none.
pub const DEFAULT_UPLOAD_FOLDER: &str = "uploads";

/// Folder holding profile images.
pub const PROFILE_FOLDER: &str = "profiles";

/// S3 rejects keys longer than this.
pub const MAX_KEY_BYTES: usize = 1024;

/// A validated object key, without a leading slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectKey(String);

impl ObjectKey {
    fn new(key: String) -> StorageResult<Self> {
        if key.len() > MAX_KEY_BYTES {
            return Err(StorageError::KeyTooLong {
                len: key.len(),
                max: MAX_KEY_BYTES,
            });
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `"{folder}/{id}-{file_name}"`, folder defaulting to `uploads`.
pub fn upload_key(folder: Option<&str>, file_name: &str, id: Uuid) -> StorageResult<ObjectKey> {
    let folder = normalize_folder(folder)?;
    let file_name = file_name_component(file_name)?;
    ObjectKey::new(format!("{}/{}-{}", folder, id, file_name))
}

/// `"profiles/{millis}-{file_name}"`.
pub fn profile_image_key(file_name: &str, millis: i64) -> StorageResult<ObjectKey> {
    let file_name = file_name_component(file_name)?;
    ObjectKey::new(format!("{}/{}-{}", PROFILE_FOLDER, millis, file_name))
}

/// Last path component of a client-supplied name, either separator.
pub fn file_name_component(raw: &str) -> StorageResult<&str> {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() || name == "." || name == ".." {
        return Err(StorageError::InvalidFileName(raw.to_string()));
    }
    if name.chars().any(char::is_control) {
        return Err(StorageError::InvalidFileName(raw.to_string()));
    }
    Ok(name)
}

/// Trim surrounding slashes and check each segment.
pub fn normalize_folder(raw: Option<&str>) -> StorageResult<String> {
    let folder = raw.map(|f| f.trim().trim_matches('/')).unwrap_or_default();
    if folder.is_empty() {
        return Ok(DEFAULT_UPLOAD_FOLDER.to_string());
    }
    for segment in folder.split('/') {
        let allowed = segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if segment.is_empty() || segment == "." || segment == ".." || !allowed {
            return Err(StorageError::InvalidFolder(folder.to_string()));
        }
    }
    Ok(folder.to_string())
}
