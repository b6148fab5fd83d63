//! Daemon configuration, loaded from `config.toml`.
//!
//! The file only seeds startup state: the `[location]` section is written
//! into the state store once at boot, and the remaining sections wire up
//! clients and the schedule.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::store::{LocationMethod, Settings};

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Weather and geolocation service endpoints
    #[serde(default)]
    pub api: ApiConfig,

    /// Location resolution settings seeded into the state store
    #[serde(default)]
    pub location: LocationConfig,

    /// Tick schedule
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Notification presentation
    #[serde(default)]
    pub notify: NotifyConfig,

    /// State store placement
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// OpenWeatherMap API key (the SKYWATCH_API_KEY environment variable
    /// overrides this)
    pub key: String,

    /// Base URL for the weather and geocoding endpoints
    pub weather_base_url: String,

    /// Base URL for the IP geolocation service
    pub ip_base_url: String,

    /// Language tag passed to the weather provider for condition labels
    pub lang: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: std::env::var("SKYWATCH_API_KEY").unwrap_or_default(),
            weather_base_url: "https://api.openweathermap.org".to_string(),
            ip_base_url: "https://ipapi.co".to_string(),
            lang: "zh_tw".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LocationConfig {
    /// How to obtain coordinates: "geo", "manual" or "ip"
    pub method: LocationMethod,

    /// Place name to geocode when method is "manual"
    pub query: String,
}

impl LocationConfig {
    /// The settings record seeded into the state store at startup.
    pub fn settings(&self) -> Settings {
        let query = self.query.trim();
        Settings {
            location_method: self.method,
            location_input: if query.is_empty() {
                None
            } else {
                Some(query.to_string())
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Minutes between ticks
    #[serde(default = "default_tick_minutes")]
    pub tick_minutes: u32,
}

fn default_tick_minutes() -> u32 {
    10
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_minutes: default_tick_minutes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Themed icon name shown with desktop alerts
    #[serde(default = "default_icon")]
    pub icon: String,
}

fn default_icon() -> String {
    "weather-severe-alert".to_string()
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            icon: default_icon(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the SQLite state database
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("skywatch")
        .join("state.db")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let mut config: Config =
            toml::from_str(&contents).context("Failed to parse config file")?;

        // The environment always wins over the file for the API key.
        if let Ok(key) = std::env::var("SKYWATCH_API_KEY") {
            if !key.is_empty() {
                config.api.key = key;
            }
        }

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.api.weather_base_url, "api.weather_base_url", &mut result);
        self.validate_url(&self.api.ip_base_url, "api.ip_base_url", &mut result);

        if self.api.key.is_empty() {
            result.add_warning(
                "api.key",
                "API key is empty - weather requests will fail (set api.key or SKYWATCH_API_KEY)",
            );
        }

        if self.api.lang.is_empty() {
            result.add_warning("api.lang", "Language tag is empty");
        }

        if self.scheduler.tick_minutes == 0 {
            result.add_error(
                "scheduler.tick_minutes",
                "Tick interval must be at least 1 minute",
            );
        } else if self.scheduler.tick_minutes > 1440 {
            result.add_warning(
                "scheduler.tick_minutes",
                "Tick interval is more than 24 hours",
            );
        }

        if self.location.method == LocationMethod::Manual && self.location.query.trim().is_empty() {
            result.add_warning(
                "location.query",
                "Manual location selected without a place name - falling back to cached/IP location",
            );
        }

        if self.notify.icon.is_empty() {
            result.add_warning("notify.icon", "Notification icon is empty");
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if let Some(port) = url.port() {
                    if port == 0 {
                        result.add_error(field_name, "Port cannot be 0");
                    }
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skywatch");

        Ok(config_dir.join("config.toml"))
    }
}
