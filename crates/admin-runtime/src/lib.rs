//! # Menudesk Admin Runtime
//!
//! Hosts the admin gateway as a process.
//!
//! ## Startup Sequence
//!
//! 1. Initialise logging (`md-telemetry`)
//! 2. Load [`RuntimeConfig`] from the environment
//! 3. Validate it (strictly when `MD_ENVIRONMENT=production`)
//! 4. Wire datastore and object storage adapters
//! 5. Serve until Ctrl+C, then drain in-flight requests
//!
//! ```text
//!  env ──→ RuntimeConfig ──→ build_backends ──→ AdminGatewayService ──→ axum
//!                              │        │
//!                   hosted | memory   s3 | memory
//! ```

pub mod container;

use anyhow::{Context, Result};
use md_04_admin_gateway::AdminGatewayService;
use std::future::Future;
use tracing::info;

pub use container::{build_backends, RuntimeConfig};

/// The admin gateway plus the configuration it was built from.
pub struct AdminRuntime {
    config: RuntimeConfig,
    gateway: AdminGatewayService,
}

impl AdminRuntime {
    /// Validate `config` and wire every adapter.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        if config.is_production() {
            config
                .validate_for_production()
                .context("production configuration rejected")?;
        } else {
            config.validate().context("configuration rejected")?;
        }

        let backends = build_backends(&config).context("failed to wire adapters")?;
        let gateway =
            AdminGatewayService::new(config.gateway.clone(), backends.ports, backends.storage)
                .context("failed to build admin gateway")?;

        Ok(Self { config, gateway })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn gateway(&self) -> &AdminGatewayService {
        &self.gateway
    }

    /// Serve until `shutdown` resolves.
    pub async fn run<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("===========================================");
        info!("  Menudesk Admin Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("  Environment: {}", self.config.environment);
        info!("  Backend: {:?}  Storage: {:?}", self.config.backend, self.config.storage);
        info!("===========================================");

        self.gateway
            .run(shutdown)
            .await
            .context("admin gateway failed")?;

        info!("Shutdown complete");
        Ok(())
    }
}
