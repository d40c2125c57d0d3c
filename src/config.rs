//! Configuration management for EnergyMuffin
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files with support for environment variable overrides.

use crate::error::{MuffinError, Result};
use crate::forecast::aggregate::MissingMonthPolicy;
use crate::forecast::tariff::TariffSchedule;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod defaults;

/// Environment variable holding the forecasting API key
pub const API_KEY_ENV: &str = "EIAPI_DEV_API_KEY";

/// Environment variable pointing to an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "ENERGYMUFFIN_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Building energy model API connection
    pub api: ApiConfig,

    /// Time-of-day tariff used for costing
    pub tariff: TariffSchedule,

    /// Monthly comparison behaviour
    pub aggregation: AggregationConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Web server binding configuration
    pub web: WebConfig,
}

/// Building energy model API parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Full URL of the calculate endpoint
    pub endpoint: String,

    /// API key sent as `X-API-Key`; sourced from the environment, never written out
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Aggregation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// What to do with months reported by only one of the two scenarios
    pub missing_months: MissingMonthPolicy,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Path to log file
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Bind address
    pub host: String,

    /// TCP port
    pub port: u16,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the first available location, then apply
    /// environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::load_default_paths()?,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn load_default_paths() -> Result<Self> {
        let default_paths = ["energymuffin.yaml", "/etc/energymuffin/config.yaml"];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        Ok(Config::default())
    }

    /// Overlay values taken from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV) {
            self.api.api_key = key.trim().to_string();
        }
        if let Some(host) = lookup("HOST").filter(|h| !h.trim().is_empty()) {
            self.web.host = host.trim().to_string();
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse::<u16>().ok()) {
            self.web.port = port;
        }
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api.endpoint.trim().is_empty() {
            return Err(MuffinError::validation(
                "api.endpoint",
                "Endpoint cannot be empty",
            ));
        }

        if self.api.api_key.trim().is_empty() {
            return Err(MuffinError::validation(
                "api.api_key",
                format!("API key missing; set {}", API_KEY_ENV),
            ));
        }

        if self.api.timeout_secs == 0 {
            return Err(MuffinError::validation(
                "api.timeout_secs",
                "Must be greater than 0",
            ));
        }

        self.tariff.validate()?;

        if self.web.port == 0 {
            return Err(MuffinError::validation(
                "web.port",
                "Port must be greater than 0",
            ));
        }

        Ok(())
    }
}
