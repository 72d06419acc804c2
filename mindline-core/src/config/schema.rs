//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration for mindline
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Remote inference endpoint configuration
    #[serde(default)]
    pub inference: InferenceConfig,
    /// User database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Caller-state cookie configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            overrides: HashMap::new(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

/// Remote chat-completion endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Full URL of the chat completions endpoint
    #[serde(default = "default_inference_endpoint")]
    pub endpoint: String,
    /// Bearer token; empty means "not configured"
    #[serde(default)]
    pub api_key: String,
    /// Model identifier sent with every request
    #[serde(default = "default_inference_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    /// Request timeout. Unset keeps the transport default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_inference_endpoint() -> String {
    "https://models.github.ai/inference/chat/completions".to_string()
}

fn default_inference_model() -> String {
    "meta/Llama-3.2-11B-Vision-Instruct".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    800
}

fn default_top_p() -> f64 {
    0.95
}

impl InferenceConfig {
    /// The bearer token, if one is configured
    pub fn api_key(&self) -> Option<&str> {
        let key = self.api_key.trim();
        if key.is_empty() {
            None
        } else {
            Some(key)
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_inference_endpoint(),
            api_key: String::new(),
            model: default_inference_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            timeout_secs: None,
        }
    }
}

/// User database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_url() -> String {
    "sqlite://mindline.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

/// Caller-state cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC key for signing the caller-state cookie
    #[serde(default)]
    pub session_secret: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

fn default_cookie_name() -> String {
    "mindline_session".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: String::new(),
            cookie_name: default_cookie_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inference_defaults() {
        let inference = InferenceConfig::default();
        assert!((inference.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(inference.max_tokens, 800);
        assert!((inference.top_p - 0.95).abs() < f64::EPSILON);
        assert!(inference.timeout_secs.is_none());
        assert!(inference.api_key().is_none());
    }

    #[test]
    fn test_blank_api_key_is_treated_as_missing() {
        let inference = InferenceConfig {
            api_key: "   ".to_string(),
            ..Default::default()
        };
        assert!(inference.api_key().is_none());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"server":{"port":8080}}"#).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.auth.cookie_name, "mindline_session");
    }
}
