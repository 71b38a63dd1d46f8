//! Default values applied when the configuration file omits a field

use common::types::DEFAULT_PAIRS;
use common::Tenor;

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_http_port() -> u16 {
    8080
}

pub fn default_timeout_secs() -> u64 {
    10
}

pub fn default_max_concurrent() -> usize {
    4
}

pub fn default_fields() -> Vec<String> {
    vec![
        "PX_LAST".to_string(),
        "PX_BID".to_string(),
        "PX_ASK".to_string(),
    ]
}

pub fn default_ttl_secs() -> u64 {
    10
}

pub fn default_max_entries() -> usize {
    1024
}

pub fn default_pairs() -> Vec<String> {
    DEFAULT_PAIRS.iter().map(|p| p.to_string()).collect()
}

pub fn default_tenors() -> Vec<String> {
    Tenor::all().iter().map(|t| t.as_str().to_string()).collect()
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}
