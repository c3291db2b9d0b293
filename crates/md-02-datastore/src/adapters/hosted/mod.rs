//! Hosted backend adapter (auth + row store over HTTPS).

pub mod auth;
pub mod client;
pub mod config;
pub mod rows;

pub use client::{classify, HostedBackend};
pub use config::HostedConfig;
