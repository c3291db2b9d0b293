pub mod memory;
pub mod s3;

pub use memory::{InMemoryObjectStorage, StoredObject};
pub use s3::S3ObjectStorage;
