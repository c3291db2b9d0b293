//! # Object Storage (md-03)
//!
//! Naming, presigning, and uploading files kept in an S3-compatible bucket:
//! menu assets under `uploads/` and profile images under `profiles/`.
//!
//! ## Flow
//!
//! ```text
//! client ── GET /api/uploads/presign?file=a.png ──→ gateway
//!                                                    │ upload_key + presign
//! client ←──────────── { url, key, fileUrl } ────────┘
//! client ── PUT url (bytes) ──→ bucket
//! ```
//!
//! Profile images take the other path: the gateway receives the bytes and
//! calls [`ObjectStorage::put_object`] itself.
//!
//! ## Usage
//!
//! ```ignore
//! use md_03_object_storage::{upload_key, ObjectStorage, S3Config, S3ObjectStorage};
//!
//! let storage = S3ObjectStorage::new(config)?;
//! let key = upload_key(None, "logo.png", uuid::Uuid::new_v4())?;
//! let upload = storage.presign_upload(&key).await?;
//! ```

pub mod adapters;
pub mod config;
pub mod error;
pub mod keys;
pub mod ports;
pub mod sigv4;

pub use adapters::{InMemoryObjectStorage, S3ObjectStorage, StoredObject};
pub use config::S3Config;
pub use error::{StorageError, StorageResult};
pub use keys::{
    file_name_component, normalize_folder, profile_image_key, upload_key, ObjectKey,
    DEFAULT_UPLOAD_FOLDER, PROFILE_FOLDER,
};
pub use ports::{ObjectStorage, PresignedUpload};
pub use sigv4::{Credentials, PresignRequest};
