//! Configuration management for the `tenki` service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TenkiError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the `tenki` service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TenkiConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// External service endpoints
    pub services: ServicesConfig,
    /// Romaji converter settings
    pub converter: ConverterConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Listening port
    pub port: u16,
    /// Directory with a built frontend, served for unknown paths
    pub static_dir: Option<PathBuf>,
}

/// External service endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Base URL of the Open-Meteo geocoding API
    pub geocoding_base_url: String,
    /// Base URL of the Open-Meteo forecast API
    pub forecast_base_url: String,
    /// Base URL of the VOICEVOX engine
    pub voicevox_engine_url: String,
    /// Timeout for every outbound call, in seconds
    pub timeout_seconds: u32,
}

/// Romaji converter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Path to a vibrato system dictionary (`.dic` or `.dic.zst`)
    pub dictionary_path: Option<PathBuf>,
    /// CSV column holding the katakana reading in the dictionary features
    pub reading_field: usize,
    /// Await converter initialization instead of answering 503
    pub await_ready: bool,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8787
}

fn default_geocoding_base_url() -> String {
    "https://geocoding-api.open-meteo.com/v1".to_string()
}

fn default_forecast_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_voicevox_engine_url() -> String {
    "http://voicevox-engine:50021".to_string()
}

fn default_timeout() -> u32 {
    5
}

fn default_reading_field() -> usize {
    7
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
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            geocoding_base_url: default_geocoding_base_url(),
            forecast_base_url: default_forecast_base_url(),
            voicevox_engine_url: default_voicevox_engine_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            dictionary_path: None,
            reading_field: default_reading_field(),
            await_ready: false,
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

impl ServicesConfig {
    /// Timeout applied to every outbound call
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl TenkiConfig {
    /// Load configuration from the given file (or the default path) and the environment
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TENKI_SERVER__PORT, TENKI_SERVICES__TIMEOUT_SECONDS, ...
        builder = builder.add_source(
            Environment::with_prefix("TENKI")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TenkiConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_deployment_env(
            std::env::var("PORT").ok(),
            std::env::var("VOICEVOX_ENGINE_URL").ok(),
        )?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tenki").join("config.toml"))
    }

    /// Apply the bare `PORT` and `VOICEVOX_ENGINE_URL` variables used by
    /// container deployments. They win over file and prefixed values.
    pub fn apply_deployment_env(
        &mut self,
        port: Option<String>,
        voicevox_engine_url: Option<String>,
    ) -> Result<()> {
        if let Some(port) = port.filter(|p| !p.trim().is_empty()) {
            self.server.port = port.trim().parse().map_err(|_| {
                TenkiError::config(format!("PORT must be a valid port number, got '{port}'"))
            })?;
        }
        if let Some(url) = voicevox_engine_url.filter(|u| !u.trim().is_empty()) {
            self.services.voicevox_engine_url = url.trim().to_string();
        }
        Ok(())
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.services.geocoding_base_url.is_empty() {
            self.services.geocoding_base_url = default_geocoding_base_url();
        }
        if self.services.forecast_base_url.is_empty() {
            self.services.forecast_base_url = default_forecast_base_url();
        }
        if self.services.voicevox_engine_url.is_empty() {
            self.services.voicevox_engine_url = default_voicevox_engine_url();
        }
        if self.services.timeout_seconds == 0 {
            self.services.timeout_seconds = default_timeout();
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

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(TenkiError::config("Server port cannot be 0").into());
        }

        if self.services.timeout_seconds > 300 {
            return Err(
                TenkiError::config("Service timeout cannot exceed 300 seconds").into(),
            );
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TenkiError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TenkiError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Geocoding", &self.services.geocoding_base_url),
            ("Forecast", &self.services.forecast_base_url),
            ("VOICEVOX engine", &self.services.voicevox_engine_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TenkiError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
