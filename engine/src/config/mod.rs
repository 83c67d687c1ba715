//! Configuration management
//!
//! This module handles loading, validation, and management of the Oopsie configuration.
//! Configuration is stored in TOML format at ~/.oopsie/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level and timezone
//! - **llm**: Reasoning provider endpoint and sampling settings
//! - **session**: Conversation history bounds
//! - **cache**: Space cache freshness
//!
//! API keys are not part of the file. `llm.api_key_env` names the environment
//! variable the key is read from.
//!
//! # Examples
//!
//! ```no_run
//! use oopsie_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//!
//! println!("Timezone: {}", config.core.timezone);
//! println!("Model: {}", config.llm.model);
//! # Ok(())
//! # }
//! ```

use chrono_tz::Tz;
use oopsie_sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core settings
    #[serde(default)]
    pub core: CoreConfig,

    /// Reasoning provider configuration
    #[serde(default)]
    pub llm: LLMConfig,

    /// Conversation session configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Space cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// IANA timezone of the user, used for dates in the system instruction
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// Reasoning provider configuration (OpenAI-compatible endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Base URL of the chat completions API
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Sampling temperature (0.0-2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Maximum tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Timeout for one completion call in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum reasoning steps per turn
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Messages retained after each turn
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
}

/// Space cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry time-to-live in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_timezone() -> String {
    "Europe/Madrid".to_string()
}

fn default_llm_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_llm_model() -> String {
    "openai/gpt-4o-mini".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_llm_timeout_secs() -> u64 {
    120
}

fn default_max_iterations() -> usize {
    8
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

fn default_max_messages() -> usize {
    10
}

fn default_cache_ttl_secs() -> u64 {
    1800
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            timezone: default_timezone(),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout_secs(),
            max_iterations: default_max_iterations(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl LLMConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from the default location (~/.oopsie/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let config = Self::default_config();
        config.validate()?;

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.oopsie/config.toml)
    pub fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".oopsie").join("config.toml"))
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            core: CoreConfig::default(),
            llm: LLMConfig::default(),
            session: SessionConfig::default(),
            cache: CacheConfig::default(),
        }
    }

    /// Parsed timezone of the user
    pub fn timezone(&self) -> Result<Tz, EngineError> {
        parse_timezone(&self.core.timezone)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Validate log level, timezone and numeric ranges
    pub fn validate(&self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        parse_timezone(&self.core.timezone)?;

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(EngineError::Config(
                "temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        if self.llm.max_tokens == 0 {
            return Err(EngineError::Config(
                "max_tokens must be greater than 0".to_string(),
            ));
        }
        if self.llm.timeout_secs == 0 {
            return Err(EngineError::Config(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.llm.max_iterations == 0 {
            return Err(EngineError::Config(
                "max_iterations must be greater than 0".to_string(),
            ));
        }
        if self.llm.api_key_env.trim().is_empty() {
            return Err(EngineError::Config(
                "api_key_env must name an environment variable".to_string(),
            ));
        }
        if self.session.max_messages < 2 {
            return Err(EngineError::Config(
                "max_messages must be at least 2".to_string(),
            ));
        }
        if self.cache.ttl_secs == 0 {
            return Err(EngineError::Config(
                "ttl_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_timezone(name: &str) -> Result<Tz, EngineError> {
    name.parse::<Tz>()
        .map_err(|e| EngineError::Config(format!("Unknown timezone '{}': {}", name, e)))
}
