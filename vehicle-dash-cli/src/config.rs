//! Configuration loading and parsing
//!
//! Optional `config.toml` for the dashboard: backend base URL, per-module
//! poll intervals, request timeout and the panel cap. Every field has a
//! default matching the source dashboard, so an empty file is valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub panel: PanelConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Backend base URL, e.g. "http://127.0.0.1:5000"
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

/// Poll periods per status module, in milliseconds.
///
/// Defaults are the source dashboard's timer periods: 576ms for connection,
/// door and welcome-light, 288ms for ranging and user.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
    #[serde(default = "default_slow_period")]
    pub connection_ms: u64,
    #[serde(default = "default_slow_period")]
    pub door_ms: u64,
    #[serde(default = "default_fast_period")]
    pub ranging_ms: u64,
    #[serde(default = "default_fast_period")]
    pub user_ms: u64,
    #[serde(default = "default_slow_period")]
    pub welcome_ms: u64,
    /// Animation step period for the render driver
    #[serde(default = "default_frame_period")]
    pub frame_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PanelConfig {
    /// Maximum retained transition rows
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_request_timeout() -> u64 {
    1000
}

fn default_slow_period() -> u64 {
    576
}

fn default_fast_period() -> u64 {
    288
}

fn default_frame_period() -> u64 {
    33
}

fn default_max_rows() -> usize {
    100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            connection_ms: default_slow_period(),
            door_ms: default_slow_period(),
            ranging_ms: default_fast_period(),
            user_ms: default_fast_period(),
            welcome_ms: default_slow_period(),
            frame_ms: default_frame_period(),
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            max_rows: default_max_rows(),
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [server]
            base_url = "http://10.0.0.5:5000"

            [polling]
            connection_ms = 250

            [panel]
            max_rows = 50
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.server.base_url, "http://10.0.0.5:5000");
        assert_eq!(config.polling.connection_ms, 250);
        // Unspecified fields keep their defaults
        assert_eq!(config.polling.ranging_ms, 288);
        assert_eq!(config.panel.max_rows, 50);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.polling.connection_ms, 576);
        assert_eq!(config.polling.door_ms, 576);
        assert_eq!(config.polling.user_ms, 288);
        assert_eq!(config.server.request_timeout_ms, 1000);
        assert_eq!(config.panel.max_rows, 100);
    }
}
