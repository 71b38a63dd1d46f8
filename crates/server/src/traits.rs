//! Server traits for lifecycle management
//!
//! This module defines the core [`Server`] trait that server implementations
//! must implement, along with the [`ServerExt`] extension trait that provides
//! convenience methods.

use async_trait::async_trait;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// Core server trait providing a consistent interface for starting, running,
/// and monitoring a server.
///
/// # Example
///
/// ```ignore
/// use server::{Server, ServerExt, HttpServer, ServerConfig};
///
/// let config = ServerConfig::new("127.0.0.1", 8080);
/// let server = HttpServer::new(config, router);
///
/// // Run with automatic shutdown handling
/// server.run_with_ctrl_c().await?;
/// ```
#[async_trait]
pub trait Server: Send + Sync + 'static {
    /// Returns the server's name for logging and identification.
    fn name(&self) -> &str;

    /// Returns the address the server is bound to, if running.
    fn address(&self) -> Option<SocketAddr>;

    /// Returns true if the server is currently running.
    fn is_running(&self) -> bool;

    /// Runs the server until the shutdown token is cancelled.
    ///
    /// Implementations bind to the configured address, serve requests until
    /// `shutdown` is cancelled, then drain existing connections before
    /// returning.
    async fn run(&self, shutdown: CancellationToken) -> Result<()>;
}

/// Extension trait providing convenience methods for servers.
///
/// Automatically implemented for all types that implement [`Server`].
pub trait ServerExt: Server + Sized {
    /// Spawns the server on a new task and returns a handle and shutdown token.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let (handle, token) = server.spawn();
    ///
    /// // Do other work...
    ///
    /// token.cancel();
    /// handle.await??;
    /// ```
    fn spawn(self) -> (tokio::task::JoinHandle<Result<()>>, CancellationToken) {
        let token = CancellationToken::new();
        let token_clone = token.clone();
        let handle = tokio::spawn(async move { self.run(token_clone).await });
        (handle, token)
    }

    /// Runs the server with automatic Ctrl+C handling.
    fn run_with_ctrl_c(self) -> impl std::future::Future<Output = Result<()>> + Send {
        async move {
            let shutdown = crate::shutdown::ShutdownController::with_ctrl_c();
            self.run(shutdown.token()).await
        }
    }
}

// Blanket implementation for all Server types
impl<T: Server + Sized> ServerExt for T {}
