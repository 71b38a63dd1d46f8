use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<GatewayConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!("Config file content length: {} bytes", content.len());

    // Perform environment variable substitution
    let substituted = substitution::substitute_env_vars(&content)?;

    // Parse YAML
    let config: GatewayConfig =
        serde_yaml::from_str(&substituted).with_context(|| "Failed to parse YAML configuration")?;

    info!("Configuration loaded successfully");
    Ok(config)
}

#[instrument]
pub fn generate_default_config() -> GatewayConfig {
    use defaults::*;

    GatewayConfig {
        gateway: ServiceConfig {
            name: "fxgate".to_string(),
            host: default_host(),
            http_port: default_http_port(),
        },
        upstream: UpstreamConfig {
            base_url: "http://localhost:9443".to_string(),
            timeout_secs: default_timeout_secs(),
            max_concurrent_requests: default_max_concurrent(),
            default_fields: default_fields(),
        },
        cache: CacheConfig::default(),
        surface: SurfaceConfig {
            pairs: default_pairs(),
            tenors: default_tenors(),
        },
        log: LogConfig::default(),
    }
}

#[instrument]
pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(config: &GatewayConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving configuration to: {:?}", path);

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;

    fs::write(path, yaml).with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved successfully");
    Ok(())
}
