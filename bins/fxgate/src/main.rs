//! fxgate CLI and server binary
//!
//! Entry point for the FX volatility market-data gateway. Provides
//! commands for initializing, validating, and starting the gateway.

use anyhow::{Context, Result};
use cli::{Cli, Commands};
use common::{CurrencyPair, Tenor};
use config::{generate_default_config, load_config, save_config, validate_config, GatewayConfig};
use feed::{HttpTerminalClient, InMemoryStore, QuoteCache};
use gateway::{create_router, GatewayApiState};
use observability::{init_logging, LogFormat};
use server::{HttpServer, ServerConfig, ServerExt};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Start { config, port } => start_gateway(config, port).await,
        Commands::Validate { config } => validate_command(config).await,
        Commands::Init { output } => init_command(output).await,
    }
}

async fn start_gateway<P: AsRef<Path>>(config_path: P, port_override: Option<u16>) -> Result<()> {
    let config_path = config_path.as_ref();

    // Load and validate config before touching the logger, so a bad file
    // fails fast with a plain message
    let config = load_config(config_path)?;
    let report = validate_config(&config);

    let format = LogFormat::parse(&config.log.format).unwrap_or_default();
    init_logging("fxgate", format)?;

    debug!(?config_path, "Configuration loaded");

    if !report.warnings.is_empty() {
        warn!("Configuration warnings:");
        for warning in &report.warnings {
            warn!(field = %warning.field, message = %warning.message);
        }
    }

    if !report.is_valid() {
        error!(
            error_count = report.errors.len(),
            "Configuration validation failed"
        );
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot start gateway due to configuration errors");
    }

    let http_port = port_override.unwrap_or(config.gateway.http_port);
    if let Some(port) = port_override {
        debug!(port, "HTTP port overridden from command line");
    }

    info!(
        name = %config.gateway.name,
        host = %config.gateway.host,
        http_port,
        upstream = %config.upstream.base_url,
        "Starting gateway"
    );

    let state = build_state(&config)?;
    let router = create_router(state);

    let server_config = ServerConfig::new(config.gateway.host.clone(), http_port);
    let server = HttpServer::new(server_config, router);

    server.run_with_ctrl_c().await?;

    info!("Gateway stopped");
    Ok(())
}

/// Wire the cache, upstream client, and served-pair table into the shared
/// gateway state. Config was validated already, so pair and tenor parses
/// here only guard against races with on-disk edits.
fn build_state(config: &GatewayConfig) -> Result<Arc<GatewayApiState>> {
    let client = HttpTerminalClient::new(
        config.upstream.base_url.clone(),
        Duration::from_secs(config.upstream.timeout_secs),
        config.upstream.max_concurrent_requests,
    )
    .context("Failed to build upstream client")?;

    let store = Arc::new(InMemoryStore::new(config.cache.max_entries));
    let cache = Arc::new(QuoteCache::new(
        store,
        Duration::from_secs(config.cache.ttl_secs),
    ));

    let pairs = config
        .surface
        .pairs
        .iter()
        .map(|p| CurrencyPair::parse(p).map_err(anyhow::Error::from))
        .collect::<Result<Vec<_>>>()
        .context("Invalid currency pair in configuration")?;

    // Parsed only to confirm the configured tenor names are servable;
    // requests name their own tenors per call
    config
        .surface
        .tenors
        .iter()
        .map(|t| Tenor::parse(t).map_err(anyhow::Error::from))
        .collect::<Result<Vec<_>>>()
        .context("Invalid tenor in configuration")?;

    Ok(Arc::new(GatewayApiState {
        feed: Arc::new(client),
        cache,
        pairs,
        default_fields: config.upstream.default_fields.clone(),
    }))
}

async fn validate_command<P: AsRef<Path>>(config_path: P) -> Result<()> {
    init_logging("fxgate", LogFormat::Pretty)?;
    info!(path = ?config_path.as_ref(), "Validating configuration");

    let config = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "Failed to load configuration");
            anyhow::bail!(e);
        }
    };

    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Gateway: {}", config.gateway.name);
    println!("Upstream: {}", config.upstream.base_url);
    println!("Cache TTL: {}s", config.cache.ttl_secs);
    println!("Pairs: {}", config.surface.pairs.len());
    println!("Tenors: {}", config.surface.tenors.len());

    Ok(())
}

async fn init_command<P: AsRef<Path>>(output_path: P) -> Result<()> {
    init_logging("fxgate", LogFormat::Pretty)?;
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new configuration file");

    let config = generate_default_config();

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("This configuration includes:");
    println!("  - Gateway bind address and port");
    println!("  - Upstream terminal feed URL, timeout, and concurrency cap");
    println!("  - Cache TTL and capacity");
    println!("  - Served currency pairs and tenors");
    println!();
    println!("Next steps:");
    println!("  1. Edit the configuration file to point at your terminal feed");
    println!(
        "  2. Run 'fxgate validate --config {:?}' to check configuration",
        output_path
    );
    println!(
        "  3. Run 'fxgate start --config {:?}' to start the gateway",
        output_path
    );

    Ok(())
}
