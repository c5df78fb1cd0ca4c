//! Configuration loading and validation.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::source::{OpenDotaConfig, DEFAULT_BASE_URL};

/// Item win rate responses never exceed this many records.
pub const MAX_ITEM_LIMIT: usize = 10;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Upstream API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// API root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    15
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl UpstreamConfig {
    /// Client settings for the OpenDota source.
    pub fn client_config(&self) -> OpenDotaConfig {
        OpenDotaConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
            ..Default::default()
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Statistic defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Year used when a request names none
    #[serde(default = "default_year")]
    pub default_year: i32,

    /// Hero limit used when a request names none
    #[serde(default = "default_hero_limit")]
    pub default_hero_limit: u32,

    /// Year whose window every hero win rate query covers
    #[serde(default = "default_year")]
    pub hero_window_year: i32,

    /// Maximum items in an item win rate response, at most [`MAX_ITEM_LIMIT`]
    #[serde(default = "default_item_limit")]
    pub item_limit: usize,
}

fn default_year() -> i32 {
    2025
}

fn default_hero_limit() -> u32 {
    10
}

fn default_item_limit() -> usize {
    MAX_ITEM_LIMIT
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_year: default_year(),
            default_hero_limit: default_hero_limit(),
            hero_window_year: default_year(),
            item_limit: default_item_limit(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            upstream: UpstreamConfig::default(),
            server: ServerConfig::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::parse_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn parse_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Load from `path` if it exists, else defaults; then apply environment
    /// overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::parse_file(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `OPENDOTA_BASE_URL` and `PORT` from the given lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup("OPENDOTA_BASE_URL") {
            self.upstream.base_url = base_url;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("PORT is not a valid port: {}", port))
            })?;
        }
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Upstream timeout must be greater than 0".to_string(),
            ));
        }

        match Url::parse(&self.upstream.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "Upstream base_url must be an http(s) URL: {}",
                    self.upstream.base_url
                )))
            }
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.analytics.item_limit == 0 || self.analytics.item_limit > MAX_ITEM_LIMIT {
            return Err(ConfigError::ValidationError(format!(
                "Item limit must be between 1 and {}",
                MAX_ITEM_LIMIT
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.upstream.base_url, "https://api.opendota.com/api");
        assert_eq!(config.upstream.timeout_seconds, 15);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.analytics.default_year, 2025);
        assert_eq!(config.analytics.hero_window_year, 2025);
        assert_eq!(config.analytics.default_hero_limit, 10);
        assert_eq!(config.analytics.item_limit, 10);
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_timeout() {
        let mut config = AppConfig::default();
        config.upstream.timeout_seconds = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_base_url() {
        let mut config = AppConfig::default();
        config.upstream.base_url = "api.opendota.com".to_string();
        assert!(config.validate().is_err());

        config.upstream.base_url = "file:///tmp/api".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_item_limit() {
        let mut config = AppConfig::default();
        config.analytics.item_limit = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_item_limit_above_ten() {
        let mut config = AppConfig::default();
        config.analytics.item_limit = MAX_ITEM_LIMIT;
        assert!(config.validate().is_ok());

        config.analytics.item_limit = MAX_ITEM_LIMIT + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("OPENDOTA_BASE_URL", "http://localhost:9000/api"),
            ("PORT", "8081"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.upstream.base_url, "http://localhost:9000/api");
        assert_eq!(config.server.port, 8081);
    }

    #[test]
    fn test_env_override_bad_port() {
        let mut config = AppConfig::default();
        let result = config.apply_env_overrides(|key| (key == "PORT").then(|| "http".to_string()));

        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
log_level = "debug"

[analytics]
hero_window_year = 2024
"#,
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.analytics.hero_window_year, 2024);
        assert_eq!(config.analytics.default_year, 2025);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_env_override_repairs_file_base_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[upstream]\nbase_url = \"not a url\"\n").unwrap();

        let mut config = AppConfig::parse_file(&path).unwrap();
        assert!(config.validate().is_err());

        config
            .apply_env_overrides(|key| {
                (key == "OPENDOTA_BASE_URL").then(|| "http://localhost:9000/api".to_string())
            })
            .unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.upstream.base_url, "http://localhost:9000/api");
    }

    #[test]
    fn test_load_validates_once_after_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[analytics]\nitem_limit = 11\n").unwrap();

        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_invalid_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 0\n").unwrap();

        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigError::ValidationError(_))
        ));

        std::fs::write(&path, "[server\n").unwrap();
        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.upstream.base_url, parsed.upstream.base_url);
        assert_eq!(config.analytics.item_limit, parsed.analytics.item_limit);
    }

    #[test]
    fn test_client_config_timeout() {
        let upstream = UpstreamConfig {
            timeout_seconds: 3,
            ..Default::default()
        };
        assert_eq!(upstream.client_config().timeout, Duration::from_secs(3));
    }
}
