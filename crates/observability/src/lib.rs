//! Observability infrastructure for fxgate
//!
//! Structured logging built on `tracing`. Metrics export is intentionally
//! not part of this service; the gateway's only telemetry surface is logs
//! and the `/health` endpoint.

pub mod logging;

pub use logging::{init_default_logging, init_logging, LogFormat};
