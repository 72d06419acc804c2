//! Configuration validation rules.

use super::schema::Config;

/// Validate configuration and return aggregated validation errors.
///
/// A missing inference API key or session secret is deliberately not an
/// error here: the server degrades instead of refusing to start.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    if config.server.port == 0 {
        errors.push("server.port must be > 0".to_string());
    }

    let inference = &config.inference;
    if inference.endpoint.trim().is_empty() {
        errors.push("inference.endpoint must not be empty".to_string());
    }
    if inference.model.trim().is_empty() {
        errors.push("inference.model must not be empty".to_string());
    }
    if inference.max_tokens == 0 {
        errors.push("inference.max_tokens must be > 0".to_string());
    }
    if !(0.0..=2.0).contains(&inference.temperature) {
        errors.push("inference.temperature must be in [0.0, 2.0]".to_string());
    }
    if !(inference.top_p > 0.0 && inference.top_p <= 1.0) {
        errors.push("inference.top_p must be in (0.0, 1.0]".to_string());
    }
    if inference.timeout_secs == Some(0) {
        errors.push("inference.timeout_secs must be > 0 when set".to_string());
    }

    if !config.database.url.starts_with("sqlite:") {
        errors.push("database.url must be a sqlite: connection string".to_string());
    }
    if config.database.max_connections == 0 {
        errors.push("database.max_connections must be > 0".to_string());
    }

    if config.auth.cookie_name.trim().is_empty() {
        errors.push("auth.cookie_name must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Config(errors.join("; ")))
    }
}
