//! Configuration parsing and validation for fxgate
//!
//! The gateway is configured from a single YAML file with four sections:
//! `gateway` (bind address), `upstream` (terminal feed), `cache` (TTL) and
//! `surface` (served pairs and tenors). Environment variables in the form
//! `${VAR}` are substituted before parsing.

use serde::{Deserialize, Serialize};

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::{generate_default_config, load_config, save_config};
pub use substitution::{get_env_or_default, substitute_env_vars};
pub use validator::{validate_config, ValidationError, ValidationReport, ValidationWarning};

/// Top-level gateway configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    pub gateway: ServiceConfig,
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub surface: SurfaceConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Service identity and bind address
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    pub name: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

/// Upstream terminal feed connection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Base URL of the terminal feed service
    pub base_url: String,
    /// Whole-call timeout for a batched fetch
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Cap on simultaneous outstanding upstream calls
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
    /// Fields requested when the caller does not specify any
    #[serde(default = "default_fields")]
    pub default_fields: Vec<String>,
}

/// Raw-quote cache behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Entry lifetime; short enough to bound staleness of a live feed
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Soft cap on cached entries
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

/// Pairs and tenors the gateway serves
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SurfaceConfig {
    pub pairs: Vec<String>,
    #[serde(default = "default_tenors")]
    pub tenors: Vec<String>,
}

/// Logging output
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}
