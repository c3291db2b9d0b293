//! Admin gateway service: wiring plus the HTTP server loop.

use axum::Router;
use md_02_datastore::BackendPorts;
use md_03_object_storage::ObjectStorage;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::application::AdminService;
use crate::domain::{GatewayConfig, GatewayError};
use crate::router::build_router;

/// Admin gateway service state
pub struct AdminGatewayService {
    config: GatewayConfig,
    service: Arc<AdminService>,
    ports: BackendPorts,
}

impl AdminGatewayService {
    /// Validate `config` and assemble the service over the given backends.
    pub fn new(
        config: GatewayConfig,
        ports: BackendPorts,
        storage: Arc<dyn ObjectStorage>,
    ) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let service = Arc::new(
            AdminService::new(ports.clone(), storage)
                .with_max_image_bytes(config.limits.max_image_bytes),
        );

        Ok(Self {
            config,
            service,
            ports,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn admin_service(&self) -> Arc<AdminService> {
        Arc::clone(&self.service)
    }

    /// Router with the full middleware stack, without a listener.
    pub fn router(&self) -> Router {
        build_router(
            &self.config,
            Arc::clone(&self.service),
            Arc::clone(&self.ports.auth),
        )
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener, GatewayError> {
        let addr = self.config.http_addr();
        TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{}: {}", addr, e)))
    }

    /// Serve on `listener` until `shutdown` resolves, then drain in-flight
    /// requests.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: Option<SocketAddr> = listener.local_addr().ok();
        info!(addr = ?addr, "Admin gateway listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| GatewayError::Serve(e.to_string()))?;

        info!("Admin gateway stopped");
        Ok(())
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn run<F>(&self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }
}
