//! Cross-crate flows driven through the HTTP router.

pub mod harness;

mod gateway_flows;
mod hosted_flows;
