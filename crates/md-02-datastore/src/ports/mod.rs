//! Ports (trait definitions) for the datastore.

pub mod outbound;

pub use outbound::{
    AuthProvider, MenuStructureRepository, ProfileRepository, SystemTimeSource, TimeSource,
    TodoRepository,
};
