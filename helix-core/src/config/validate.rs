//! Configuration validation rules.

use super::schema::Config;

const URL_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    let base_url = config.api.base_url.trim();
    if base_url.is_empty() {
        errors.push("api.base_url must not be empty".to_string());
    } else if !URL_SCHEMES.iter().any(|scheme| base_url.starts_with(scheme)) {
        errors.push("api.base_url must start with http:// or https://".to_string());
    }
    if !config.api.sessions_path.starts_with('/') {
        errors.push("api.sessions_path must start with '/'".to_string());
    }
    if config.api.timeout_secs == 0 {
        errors.push("api.timeout_secs must be > 0".to_string());
    }

    if !config.stream.path.starts_with('/') {
        errors.push("stream.path must start with '/'".to_string());
    }
    if config.stream.reconnect_delay_ms == 0 {
        errors.push("stream.reconnect_delay_ms must be > 0".to_string());
    }

    let format = config.logging.format.to_lowercase();
    if format != "text" && format != "json" {
        errors.push("logging.format must be 'text' or 'json'".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}
