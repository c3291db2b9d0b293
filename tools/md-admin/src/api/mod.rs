//! Client for the admin gateway's JSON API.

mod client;

pub use client::{ClientError, GatewayClient};
