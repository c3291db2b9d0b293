//! MD-04 Admin Gateway - JSON API over the menu, todo, user and upload
//! operations of the admin tool.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                     ADMIN GATEWAY (md-04)                       │
//! ├────────────────────────────────────────────────────────────────┤
//! │  axum Router                                                    │
//! │    Tracing → CORS → Timeout → BodyLimit → Auth → handlers       │
//! │                          │                                      │
//! │                   AdminService                                  │
//! │     ┌──────────────┬─────┴────────┬──────────────────┐          │
//! │     ▼              ▼              ▼                  ▼          │
//! │  md-01 tree    md-02 auth     md-02 tables     md-03 storage    │
//! │  flatten/      (tokens,       (menus, todos,   (presign, put)   │
//! │  breadcrumbs    accounts)      profiles)                        │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sign-up, login and `/health` are public. Everything else requires
//! `Authorization: Bearer <access token>`.
//!
//! # Usage
//!
//! ```ignore
//! use md_04_admin_gateway::{AdminGatewayService, GatewayConfig};
//!
//! let gateway = AdminGatewayService::new(GatewayConfig::default(), ports, storage)?;
//! gateway.run(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod application;
pub mod domain;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;

pub use application::{AdminService, ServiceError, ServiceResult};
pub use domain::{ApiError, ApiResult, GatewayConfig, GatewayError};
pub use router::{build_router, AppState};
pub use service::AdminGatewayService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
