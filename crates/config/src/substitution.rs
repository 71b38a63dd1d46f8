use anyhow::Result;
use regex::Regex;
use std::env;
use tracing::{debug, warn};

/// Substitute environment variables in the format ${VAR_NAME}
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)\}")?;
    let mut result = content.to_string();
    let mut missing_vars = Vec::new();

    for caps in re.captures_iter(content) {
        let var_name = &caps[1];
        let placeholder = &caps[0];

        match env::var(var_name) {
            Ok(value) => {
                debug!("Substituting environment variable: {}", var_name);
                result = result.replace(placeholder, &value);
            }
            Err(_) => {
                warn!("Environment variable '{}' not set", var_name);
                // Keep the placeholder; validation will catch it later
                missing_vars.push(var_name.to_string());
            }
        }
    }

    if !missing_vars.is_empty() {
        debug!(?missing_vars, "Environment variables not set");
    }

    Ok(result)
}

/// Get environment variable with a default value
pub fn get_env_or_default(var_name: &str, default: &str) -> String {
    match env::var(var_name) {
        Ok(value) => value,
        Err(_) => {
            debug!(
                "Environment variable '{}' not set, using default: \"{}\"",
                var_name, default
            );
            default.to_string()
        }
    }
}
