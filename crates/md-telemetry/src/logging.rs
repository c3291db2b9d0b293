//! Subscriber installation.
//!
//! JSON lines carry `timestamp`, `level`, `target`, the span stack and the
//! event fields, which is what log shippers expect. Development output is
//! the compact human format.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::{TelemetryConfig, TelemetryError};

/// Build the filter from the configured level. `RUST_LOG` is only consulted
/// through [`TelemetryConfig::from_env`], below `MD_LOG_LEVEL`.
pub fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Config(format!("bad log filter: {}", e)))
}

/// Install the global subscriber.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config)?;

    let output = if !config.console_output {
        None
    } else if config.json_logs {
        Some(
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
        )
    } else {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .boxed(),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .try_init()
        .map_err(|e| TelemetryError::Init(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        json_logs = config.json_logs,
        "logging initialized"
    );
    Ok(())
}

/// Structured event with a `component` field.
///
/// ```rust,ignore
/// log_event!(info, "gateway", "menu saved", menu_id = 7);
/// ```
#[macro_export]
macro_rules! log_event {
    (info, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (warn, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (error, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (debug, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_accepts_directives() {
        let config = TelemetryConfig {
            log_level: "md_04_admin_gateway=debug,tower_http=info".into(),
            ..TelemetryConfig::default()
        };
        assert!(env_filter(&config).is_ok());
    }

    #[test]
    fn test_md_log_level_decides_filter_over_rust_log() {
        std::env::set_var("RUST_LOG", "warn");
        let config = TelemetryConfig::from_lookup(|name| match name {
            "MD_LOG_LEVEL" => Some("debug".to_string()),
            _ => std::env::var(name).ok(),
        });
        let filter = env_filter(&config).unwrap();
        assert_eq!(filter.to_string(), "debug");

        let fallback = TelemetryConfig::from_lookup(|name| match name {
            "MD_LOG_LEVEL" => None,
            _ => std::env::var(name).ok(),
        });
        assert_eq!(env_filter(&fallback).unwrap().to_string(), "warn");
    }

    #[test]
    fn test_log_event_expands() {
        // No subscriber installed; only checks the macro arms compile.
        crate::log_event!(info, "test", "plain");
        crate::log_event!(warn, "test", "with fields", count = 3, name = %"x");
        crate::log_event!(debug, "test", "debug");
        crate::log_event!(error, "test", "error", code = "E1");
    }
}
