//! Service configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML file (`pcos-screen.toml`, or the path in `PCOS_CONFIG`), then
//! environment overrides such as `PCOS_MODEL__PATH` or
//! `PCOS_SERVER__BIND`.

use ::config::{Config, ConfigError, Environment, File, FileFormat};
use data_validator::ValidationConfig;
use inference_engine::ModelConfig;
use serde::{Deserialize, Serialize};

use crate::rate_limit::RateLimitConfig;

/// Default config file name, resolved without extension
pub const DEFAULT_CONFIG_FILE: &str = "pcos-screen";

/// Top-level service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub validation: ValidationConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind: String,
    /// Per-IP limit on submission routes
    pub rate_limit: RateLimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Max level: trace, debug, info, warn, error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder and expose `/metrics`
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AppConfig {
    /// Load from defaults, the config file and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var("PCOS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name(&file).required(false))
            .add_source(
                Environment::with_prefix("PCOS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("model.classes"),
            )
            .build()?
            .try_deserialize()
    }

    /// Layer a TOML document over the defaults
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.model.path, PathBuf::from("models/pcos_pipeline_v3.onnx"));
        assert_eq!(config.model.positive_class, 1);
        assert_eq!(config.logging.level, "info");
        assert!(config.metrics.enabled);
        assert!(config.server.rate_limit.enabled);
    }

    #[test]
    fn test_toml_overrides() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            bind = "127.0.0.1:9000"

            [server.rate_limit]
            enabled = false

            [model]
            path = "/srv/models/pcos.onnx"
            positive_class = 0
            classes = [1, 0]

            [logging]
            json = true
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert!(!config.server.rate_limit.enabled);
        assert_eq!(config.model.path, PathBuf::from("/srv/models/pcos.onnx"));
        assert_eq!(config.model.classes, vec![1, 0]);
        assert_eq!(config.model.positive_class, 0);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.validation.max_text_len, 32);
    }

    #[test]
    fn test_rejects_bad_types() {
        assert!(AppConfig::from_toml("[metrics]\nenabled = \"sometimes\"").is_err());
    }
}
