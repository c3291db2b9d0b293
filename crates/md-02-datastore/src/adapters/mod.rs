//! Adapters implementing the datastore ports.

pub mod hosted;
pub mod memory;

pub use hosted::{HostedBackend, HostedConfig};
pub use memory::InMemoryBackend;
