//! Configuration management for the city weather service
//!
//! Handles loading configuration from an optional TOML file, environment
//! variables and the legacy `REDIS_ADDR` / `REDIS_PASSWORD` variables, and
//! validates the result.

use crate::WeatherError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Prefix for configuration environment variables, e.g. `CITY_WEATHER_CACHE__ADDRESS`
pub const ENV_PREFIX: &str = "CITY_WEATHER";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CityWeatherConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Forecast provider configuration
    pub upstream: UpstreamConfig,
    /// Cache store configuration
    pub cache: CacheConfig,
    /// Static dataset locations
    pub data: DataConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Deadline for a whole `/weather` request in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
}

/// Forecast provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL for the forecast API
    #[serde(default = "default_upstream_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub timeout_seconds: u32,
}

/// Cache store settings. Without an address caching is disabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis address (`host:port` or a `redis://` URL)
    #[serde(default)]
    pub address: Option<String>,
    /// Redis password
    #[serde(default)]
    pub password: Option<String>,
    /// Entry TTL in minutes
    #[serde(default = "default_cache_ttl")]
    pub ttl_minutes: u32,
    /// Startup connection timeout in seconds
    #[serde(default = "default_cache_connect_timeout")]
    pub connect_timeout_seconds: u32,
    /// Bound for a single get or set in milliseconds
    #[serde(default = "default_cache_operation_timeout")]
    pub operation_timeout_ms: u64,
}

/// Static dataset paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_locations_path")]
    pub locations_path: String,
    #[serde(default = "default_weather_codes_path")]
    pub weather_codes_path: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_request_timeout() -> u32 {
    15
}

fn default_upstream_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_upstream_timeout() -> u32 {
    10
}

fn default_cache_ttl() -> u32 {
    15
}

fn default_cache_connect_timeout() -> u32 {
    5
}

fn default_cache_operation_timeout() -> u64 {
    2000
}

fn default_locations_path() -> String {
    "data/cities.json".to_string()
}

fn default_weather_codes_path() -> String {
    "data/weather_codes.json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_base_url(),
            timeout_seconds: default_upstream_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            address: None,
            password: None,
            ttl_minutes: default_cache_ttl(),
            connect_timeout_seconds: default_cache_connect_timeout(),
            operation_timeout_ms: default_cache_operation_timeout(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            locations_path: default_locations_path(),
            weather_codes_path: default_weather_codes_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl CityWeatherConfig {
    /// Load configuration from the given file (or `config.toml`) and environment variables
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: CityWeatherConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_legacy_env();
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// `config.toml` in the working directory
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// Honor the plain `REDIS_ADDR` / `REDIS_PASSWORD` variables
    pub fn apply_legacy_env(&mut self) {
        if let Ok(address) = env::var("REDIS_ADDR") {
            self.cache.address = Some(address);
        }
        if let Ok(password) = env::var("REDIS_PASSWORD") {
            self.cache.password = Some(password);
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.upstream.base_url.is_empty() {
            self.upstream.base_url = default_upstream_base_url();
        }
        if self.upstream.timeout_seconds == 0 {
            self.upstream.timeout_seconds = default_upstream_timeout();
        }
        if self.cache.ttl_minutes == 0 {
            self.cache.ttl_minutes = default_cache_ttl();
        }
        if self.cache.connect_timeout_seconds == 0 {
            self.cache.connect_timeout_seconds = default_cache_connect_timeout();
        }
        if self.cache.operation_timeout_ms == 0 {
            self.cache.operation_timeout_ms = default_cache_operation_timeout();
        }
        // blank credentials mean "not configured"
        if self.cache.address.as_deref().is_some_and(|a| a.trim().is_empty()) {
            self.cache.address = None;
        }
        if self.cache.password.as_deref().is_some_and(str::is_empty) {
            self.cache.password = None;
        }
        if self.data.locations_path.is_empty() {
            self.data.locations_path = default_locations_path();
        }
        if self.data.weather_codes_path.is_empty() {
            self.data.weather_codes_path = default_weather_codes_path();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(WeatherError::config("Server port must not be 0").into());
        }

        if self.server.request_timeout_seconds > 300 {
            return Err(
                WeatherError::config("Request timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.upstream.timeout_seconds > 300 {
            return Err(
                WeatherError::config("Upstream timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.cache.ttl_minutes > 24 * 60 {
            return Err(WeatherError::config("Cache TTL cannot exceed 1440 minutes").into());
        }

        if self.cache.operation_timeout_ms > 60_000 {
            return Err(
                WeatherError::config("Cache operation timeout cannot exceed 60000 ms").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.upstream.base_url.starts_with("http://")
            && !self.upstream.base_url.starts_with("https://")
        {
            return Err(WeatherError::config(
                "Upstream base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = CityWeatherConfig::default();
        assert_eq!(config.upstream.base_url, "https://api.open-meteo.com/v1");
        assert_eq!(config.upstream.timeout_seconds, 10);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.request_timeout_seconds, 15);
        assert_eq!(config.cache.ttl_minutes, 15);
        assert_eq!(config.logging.level, "info");
        assert!(config.cache.address.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = CityWeatherConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = CityWeatherConfig::default();
        config.upstream.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_base_url() {
        let mut config = CityWeatherConfig::default();
        config.upstream.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_cache_settings_disable_cache() {
        let mut config = CityWeatherConfig::default();
        config.cache.address = Some("  ".to_string());
        config.cache.password = Some(String::new());
        config.apply_defaults();
        assert!(config.cache.address.is_none());
        assert!(config.cache.password.is_none());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[server]
port = 9090

[cache]
address = "localhost:6379"
ttl_minutes = 10

[logging]
format = "json"
"#
        )
        .unwrap();

        let config = CityWeatherConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.cache.ttl_minutes, 10);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.upstream.timeout_seconds, 10);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            CityWeatherConfig::load_from_path(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.data.locations_path, "data/cities.json");
        assert_eq!(config.cache.operation_timeout_ms, 2000);
    }
}
