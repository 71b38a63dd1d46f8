//! HTTP server infrastructure for fxgate
//!
//! The gateway serves a single HTTP surface. The [`Server`] trait provides a
//! consistent interface for running and monitoring it, and [`ServerExt`]
//! adds convenience methods like `spawn()` and `run_with_ctrl_c()`.
//!
//! Shutdown coordination uses `CancellationToken` from `tokio_util`:
//! cancelling a parent token automatically cancels all child tokens, which
//! lets the binary drive the server and any background tasks from one
//! controller.

pub mod config;
pub mod error;
pub mod http;
pub mod shutdown;
pub mod traits;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use http::HttpServer;
pub use shutdown::{shutdown_signal, ShutdownController};
pub use traits::{Server, ServerExt};
