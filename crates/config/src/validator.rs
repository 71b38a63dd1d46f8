use crate::GatewayConfig;
use common::{CurrencyPair, Tenor};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    #[error("Gateway name is required")]
    MissingGatewayName,

    #[error("HTTP port must be non-zero")]
    InvalidHttpPort,

    #[error("Invalid upstream base URL '{url}': {message}")]
    InvalidUpstreamUrl { url: String, message: String },

    #[error("Upstream base URL contains an unresolved placeholder: {0}")]
    UnresolvedEnvVar(String),

    #[error("upstream.timeout_secs must be a positive integer")]
    InvalidTimeout,

    #[error("upstream.max_concurrent_requests must be a positive integer")]
    InvalidConcurrency,

    #[error("cache.ttl_secs must be a positive integer")]
    InvalidTtl,

    #[error("cache.max_entries must be a positive integer")]
    InvalidMaxEntries,

    #[error("No currency pairs configured")]
    NoPairs,

    #[error("Invalid currency pair '{0}': must be a 6-letter FX code")]
    InvalidPair(String),

    #[error("Unknown tenor '{0}'")]
    UnknownTenor(String),

    #[error("Unknown log format '{0}': must be one of pretty, json, compact")]
    UnknownLogFormat(String),
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn warn(&mut self, field: &str, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.into(),
        });
    }
}

/// Validate a gateway configuration, collecting every problem rather than
/// stopping at the first.
pub fn validate_config(config: &GatewayConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.gateway.name.trim().is_empty() {
        report.errors.push(ValidationError::MissingGatewayName);
    }
    if config.gateway.http_port == 0 {
        report.errors.push(ValidationError::InvalidHttpPort);
    }

    validate_upstream(config, &mut report);
    validate_cache(config, &mut report);
    validate_surface(config, &mut report);

    if !matches!(config.log.format.as_str(), "pretty" | "json" | "compact") {
        report
            .errors
            .push(ValidationError::UnknownLogFormat(config.log.format.clone()));
    }

    report
}

fn validate_upstream(config: &GatewayConfig, report: &mut ValidationReport) {
    let url = &config.upstream.base_url;

    if url.contains("${") {
        report
            .errors
            .push(ValidationError::UnresolvedEnvVar(url.clone()));
    } else {
        match Url::parse(url) {
            Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
            Ok(parsed) => report.errors.push(ValidationError::InvalidUpstreamUrl {
                url: url.clone(),
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            }),
            Err(e) => report.errors.push(ValidationError::InvalidUpstreamUrl {
                url: url.clone(),
                message: e.to_string(),
            }),
        }
    }

    if config.upstream.timeout_secs == 0 {
        report.errors.push(ValidationError::InvalidTimeout);
    } else if config.upstream.timeout_secs > 30 {
        report.warn(
            "upstream.timeout_secs",
            "timeouts above 30s hold coalesced waiters for a long time",
        );
    }

    if config.upstream.max_concurrent_requests == 0 {
        report.errors.push(ValidationError::InvalidConcurrency);
    }
}

fn validate_cache(config: &GatewayConfig, report: &mut ValidationReport) {
    if config.cache.ttl_secs == 0 {
        report.errors.push(ValidationError::InvalidTtl);
    } else if !(5..=15).contains(&config.cache.ttl_secs) {
        report.warn(
            "cache.ttl_secs",
            "recommended range is 5-15s for a live market feed",
        );
    }

    if config.cache.max_entries == 0 {
        report.errors.push(ValidationError::InvalidMaxEntries);
    }
}

fn validate_surface(config: &GatewayConfig, report: &mut ValidationReport) {
    if config.surface.pairs.is_empty() {
        report.errors.push(ValidationError::NoPairs);
    }
    for pair in &config.surface.pairs {
        if CurrencyPair::parse(pair).is_err() {
            report.errors.push(ValidationError::InvalidPair(pair.clone()));
        }
    }
    for tenor in &config.surface.tenors {
        if Tenor::parse(tenor).is_err() {
            report.errors.push(ValidationError::UnknownTenor(tenor.clone()));
        }
    }
}
