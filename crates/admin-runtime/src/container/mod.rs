//! # Runtime Container
//!
//! Configuration and adapter wiring for the executable.

pub mod config;
pub mod wiring;

pub use config::{BackendKind, ConfigError, RuntimeConfig, StorageKind};
pub use wiring::{build_backends, Backends, WiringError};
