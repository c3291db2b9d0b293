//! `admin-runtime` binary: see the library docs for the startup sequence.

use admin_runtime::{AdminRuntime, RuntimeConfig};
use anyhow::{Context, Result};
use md_telemetry::{init_telemetry, TelemetryConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::for_service("admin-runtime");
    init_telemetry(&telemetry).context("failed to initialise logging")?;

    let config = RuntimeConfig::from_env().context("failed to read configuration")?;
    let runtime = match AdminRuntime::new(config) {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %format!("{:#}", e), "startup failed");
            return Err(e);
        }
    };

    info!("Admin gateway is starting. Press Ctrl+C to stop.");
    runtime
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for Ctrl+C");
            }
            info!("Received shutdown signal");
        })
        .await
}
