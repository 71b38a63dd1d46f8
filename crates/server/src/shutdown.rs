//! Graceful shutdown utilities using CancellationToken
//!
//! Shutdown coordination uses `tokio_util::sync::CancellationToken`. Unlike
//! oneshot channels, tokens can be cloned and shared across tasks, child
//! tokens are cancelled with their parent, and cancellation can be checked
//! without consuming the token.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Coordinates graceful shutdown across multiple components.
///
/// # Example
///
/// ```ignore
/// let shutdown = ShutdownController::with_ctrl_c();
///
/// tokio::spawn(async move {
///     http_server.run(shutdown.child_token()).await;
/// });
///
/// shutdown.wait_for_shutdown().await;
/// ```
#[derive(Clone)]
pub struct ShutdownController {
    token: CancellationToken,
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownController {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Create a shutdown controller that listens for Ctrl+C.
    ///
    /// Spawns a background task that cancels the token when Ctrl+C is received.
    pub fn with_ctrl_c() -> Self {
        let controller = Self::new();
        let token = controller.token.clone();

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown...");
                    token.cancel();
                }
                Err(e) => {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                }
            }
        });

        controller
    }

    /// Get a child token that is cancelled when this controller is cancelled.
    ///
    /// Child tokens can also be cancelled independently without affecting
    /// the parent.
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Get a clone of the main token
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Trigger shutdown manually
    pub fn shutdown(&self) {
        info!("Manual shutdown triggered");
        self.token.cancel();
    }

    /// Check if shutdown has been triggered
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for shutdown to be triggered (either Ctrl+C or manual)
    pub async fn wait_for_shutdown(&self) {
        self.token.cancelled().await;
    }
}

/// Create a shutdown signal that listens for Ctrl+C.
///
/// Convenience function returning just the token for simple use cases.
pub fn shutdown_signal() -> CancellationToken {
    ShutdownController::with_ctrl_c().token()
}
