//! Gateway HTTP API
//!
//! The outward-facing surface of the gateway: a raw reference-data
//! endpoint, an assembled volatility-surface endpoint, and a health probe.
//! Handlers are stateless per request; everything shared (cache, upstream
//! client, served-pair table) lives in [`GatewayApiState`], constructed at
//! startup and passed in explicitly.

pub mod api;
pub mod error;

pub use api::handlers::GatewayApiState;
pub use api::routes::create_router;
pub use error::{GatewayError, Result};
