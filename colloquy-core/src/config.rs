//! Configuration types for Colloquy

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ColloquyError, Result};
use crate::profile::JsonFileProfileStore;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ColloquyConfig {
    /// Conversation session behavior
    pub session: SessionConfig,

    /// Model client settings
    pub http: HttpConfig,

    /// Profile storage
    pub storage: StorageConfig,
}

/// Conversation session configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Raw history entries sent with each request (user and assistant mixed)
    pub max_turns: usize,

    /// Default for clearing history when the active profile changes
    pub clear_history_on_switch: bool,

    /// Upper bound on one model call, including the HTTP round trip
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_turns: 10,
            clear_history_on_switch: true,
            timeout: Duration::from_secs(60),
        }
    }
}

/// HTTP model client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout of the underlying HTTP client
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Sampling temperature (0.0-2.0)
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(120),
            temperature: 1.0,
            max_tokens: None,
        }
    }
}

/// Profile storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Profile file; defaults to `<data_dir>/colloquy/profiles.json`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiles_path: Option<PathBuf>,

    /// Profile used when none is named explicitly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
}

impl StorageConfig {
    /// Resolve the profile file location
    ///
    /// # Errors
    ///
    /// Returns an error if no path is configured and the platform has no data directory.
    pub fn resolve_profiles_path(&self) -> Result<PathBuf> {
        match &self.profiles_path {
            Some(path) => Ok(path.clone()),
            None => JsonFileProfileStore::default_path(),
        }
    }
}

impl ColloquyConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. Configuration file (colloquy.toml, then the path in COLLOQUY_CONFIG_PATH)
    /// 3. Environment variable overrides (`COLLOQUY_SESSION__MAX_TURNS=4`)
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is invalid or a value fails validation.
    pub fn load() -> Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Serialized, Toml},
        };

        let mut figment = Figment::from(Serialized::defaults(ColloquyConfig::default()))
            .merge(Toml::file("colloquy.toml"));

        if let Ok(path) = std::env::var("COLLOQUY_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("COLLOQUY_").split("__"));

        let config: ColloquyConfig = figment.extract().map_err(|e| {
            ColloquyError::Configuration(format!("Failed to load configuration: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Serialized, Toml},
        };

        let config: ColloquyConfig = Figment::from(Serialized::defaults(ColloquyConfig::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| {
                ColloquyError::Configuration(format!("Failed to load configuration file: {}", e))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.session.max_turns == 0 {
            return Err(ColloquyError::Configuration(
                "session.max_turns must be at least 1".to_string(),
            ));
        }
        if self.session.timeout.is_zero() {
            return Err(ColloquyError::Configuration(
                "session.timeout must be greater than zero".to_string(),
            ));
        }
        if self.http.request_timeout.is_zero() {
            return Err(ColloquyError::Configuration(
                "http.request_timeout must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.http.temperature) {
            return Err(ColloquyError::Configuration(format!(
                "http.temperature must be within 0.0-2.0, got {}",
                self.http.temperature
            )));
        }
        Ok(())
    }
}
