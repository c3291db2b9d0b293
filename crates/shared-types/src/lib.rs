//! # Shared Types Crate
//!
//! Records, identifiers and the backend error taxonomy shared by every
//! menudesk crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: row shapes exchanged with the hosted backend
//!   are defined here and nowhere else.
//! - **Typed Failures**: every port returns [`BackendError`]; nothing upstream
//!   inspects error strings.
//! - **Validated Identity**: a [`UserId`] cannot be blank, so handlers never
//!   forward an empty owner to the backend.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
