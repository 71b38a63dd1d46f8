//! Server configuration

use crate::error::{Result, ServerError};
use std::net::SocketAddr;

/// Default gateway HTTP port
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Bind configuration for the gateway's HTTP listener.
///
/// # Example
///
/// ```
/// use server::config::ServerConfig;
///
/// let config = ServerConfig::new("127.0.0.1", 8080);
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// HTTP port
    pub http_port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, http_port: u16) -> Self {
        Self {
            host: host.into(),
            http_port,
        }
    }

    /// Get the HTTP socket address
    pub fn http_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.http_port)
            .parse()
            .map_err(|_| {
                ServerError::InvalidAddress(format!("{}:{}", self.host, self.http_port))
            })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            http_port: DEFAULT_HTTP_PORT,
        }
    }
}
