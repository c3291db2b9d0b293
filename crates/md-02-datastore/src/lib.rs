//! # Datastore (md-02)
//!
//! Everything the admin service reads from or writes to the hosted backend:
//! accounts and sessions, menu structures, todos, and user profiles.
//!
//! ## Architecture
//!
//! ```text
//! md-04 AdminService
//!        │
//!        ▼
//!   ports::outbound ──────┬──→ adapters::hosted  (auth + REST row API over HTTPS)
//!   (AuthProvider, ...)   └──→ adapters::memory  (process-local, for dev and tests)
//! ```
//!
//! ## Error Mapping
//!
//! | Provider status | `BackendError` |
//! |-----------------|----------------|
//! | 401, 403 | `Unauthorized` |
//! | 404, 406 | `NotFound` |
//! | 409 | `Conflict` |
//! | 400, 422 | `Invalid` |
//! | 408, 429, 5xx | `Unavailable` |
//! | other | `Internal` |
//!
//! ## Usage
//!
//! ```ignore
//! use md_02_datastore::{BackendPorts, HostedConfig};
//!
//! let ports = BackendPorts::from_hosted(HostedConfig::new(url, anon_key))?;
//! let rows = ports.menus.list().await?;
//! ```

pub mod adapters;
pub mod ports;

use std::sync::Arc;

pub use adapters::{HostedBackend, HostedConfig, InMemoryBackend};
pub use adapters::hosted::classify;
pub use ports::{
    AuthProvider, MenuStructureRepository, ProfileRepository, SystemTimeSource, TimeSource,
    TodoRepository,
};

use shared_types::BackendResult;

/// The four ports, shared behind `Arc`s so one adapter instance can serve all
/// of them.
#[derive(Clone)]
pub struct BackendPorts {
    pub auth: Arc<dyn AuthProvider>,
    pub menus: Arc<dyn MenuStructureRepository>,
    pub todos: Arc<dyn TodoRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
}

impl BackendPorts {
    /// Wire every port to one hosted backend client.
    pub fn from_hosted(config: HostedConfig) -> BackendResult<Self> {
        Ok(Self::from_shared(Arc::new(HostedBackend::new(config)?)))
    }

    /// Wire every port to one in-memory store.
    pub fn from_memory(backend: Arc<InMemoryBackend>) -> Self {
        Self::from_shared(backend)
    }

    fn from_shared<B>(backend: Arc<B>) -> Self
    where
        B: AuthProvider + MenuStructureRepository + TodoRepository + ProfileRepository + 'static,
    {
        Self {
            auth: backend.clone(),
            menus: backend.clone(),
            todos: backend.clone(),
            profiles: backend,
        }
    }
}
