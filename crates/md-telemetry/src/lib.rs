//! # Menudesk Telemetry
//!
//! One call to set up structured logging for a binary.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use md_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::for_service("admin-gateway");
//! init_telemetry(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `menudesk` | Service name on every event |
//! | `MD_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `MD_JSON_LOGS` | `false` (`true` in containers) | JSON lines output |
//! | `MD_CONSOLE_OUTPUT` | `true` | Write to stdout |
//! | `MD_ENVIRONMENT` | `local` | Deployment name |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install subscriber: {0}")]
    Init(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging for the process. Fails if a subscriber is already set.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_logging(config)
}

/// Span tagged with a component name.
///
/// ```rust,ignore
/// let _span = component_span!("seed_todos", component = "gateway", user_id = %id).entered();
/// ```
#[macro_export]
macro_rules! component_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
