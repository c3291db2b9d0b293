//! # Adapter Wiring
//!
//! Turns a [`RuntimeConfig`] into the port implementations the gateway is
//! built over. Nothing else in the executable names a concrete adapter.

use md_02_datastore::{BackendPorts, InMemoryBackend};
use md_03_object_storage::{InMemoryObjectStorage, ObjectStorage, S3ObjectStorage, StorageError};
use shared_types::BackendError;
use std::sync::Arc;
use tracing::{info, warn};

use super::config::{BackendKind, RuntimeConfig, StorageKind};

/// The adapters behind the gateway.
pub struct Backends {
    pub ports: BackendPorts,
    pub storage: Arc<dyn ObjectStorage>,
}

/// Failures constructing an adapter.
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("datastore: {0}")]
    Backend(#[from] BackendError),

    #[error("object storage: {0}")]
    Storage(#[from] StorageError),
}

pub fn build_backends(config: &RuntimeConfig) -> Result<Backends, WiringError> {
    let ports = match config.backend {
        BackendKind::Hosted => {
            info!(url = %config.hosted.base_url, "Using hosted datastore");
            if config.hosted.service_role_key.is_none() {
                warn!("No service-role key; rows use the anon key and user deletion is refused");
            }
            BackendPorts::from_hosted(config.hosted.clone())?
        }
        BackendKind::Memory => {
            warn!("Using in-memory datastore; data is lost on exit");
            BackendPorts::from_memory(Arc::new(InMemoryBackend::new()))
        }
    };

    let storage: Arc<dyn ObjectStorage> = match config.storage {
        StorageKind::S3 => {
            info!(bucket = %config.s3.bucket, region = %config.s3.region, "Using S3 object storage");
            Arc::new(S3ObjectStorage::new(config.s3.clone())?)
        }
        StorageKind::Memory => {
            warn!("Using in-memory object storage; uploads are lost on exit");
            Arc::new(InMemoryObjectStorage::new(
                config.memory_object_base_url.clone(),
            ))
        }
    };

    Ok(Backends { ports, storage })
}
