//! Domain layer for the admin gateway.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ConfigError, CorsConfig, GatewayConfig, HttpConfig, LimitsConfig, TimeoutConfig};
pub use error::{codes, ApiError, ApiResult, GatewayError};
pub use types::*;
