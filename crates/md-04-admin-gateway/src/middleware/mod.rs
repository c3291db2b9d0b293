//! Middleware for the admin gateway.
//!
//! Layer order, outermost first: Tracing → CORS → Timeout → BodyLimit →
//! Auth (protected routes only) → Handler.

pub mod auth;
pub mod cors;
pub mod timeout;
pub mod tracing;

pub use auth::{bearer_token, AuthLayer, AuthenticatedUser};
pub use cors::create_cors_layer;
pub use timeout::TimeoutLayer;
pub use tracing::TracingLayer;
