//! Application layer: use cases over the datastore and object storage ports.

pub mod errors;
pub mod service;

pub use errors::{ServiceError, ServiceResult};
pub use service::AdminService;
