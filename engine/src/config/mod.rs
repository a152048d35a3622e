//! Configuration management
//!
//! This module handles loading, validation, and management of the Persona configuration.
//! Configuration is stored in TOML format at ~/.persona/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level, data directory and failure debug info
//! - **server**: Webhook listener address
//! - **content**: Where quiz content comes from (a local bundle or an HTTP service)
//! - **quiz**: Canvas URL, SSML pause length and an optional fixed RNG seed
//!
//! # Path Expansion
//!
//! `~` in `data_dir` and `bundle_path` is expanded to the user's home directory.
//! A relative `bundle_path` is resolved against the directory holding the config file.
//!
//! # Examples
//!
//! ```no_run
//! use persona_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//! println!("Listening on {}", config.server.address());
//! println!("Content source: {:?}", config.content.source);
//! # Ok(())
//! # }
//! ```

use crate::content::{HttpContentStore, StaticContentStore};
use crate::conversation::TurnSettings;
use crate::ssml::{Ssml, DEFAULT_BREAK_MS};
use sdk::errors::EngineError;
use sdk::ContentStore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Core engine settings
    #[serde(default)]
    pub core: CoreConfig,

    /// Webhook server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Content source settings
    #[serde(default)]
    pub content: ContentConfig,

    /// Dialogue tuning
    #[serde(default)]
    pub quiz: QuizConfig,
}

/// Core engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Data directory path (supports ~ expansion)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Leave the failing handler and error hint in the session bag of failed turns
    #[serde(default)]
    pub debug_info: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Where quiz content is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    /// A JSON content bundle on disk
    Static,
    /// A content service reached over HTTP
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_content_source")]
    pub source: ContentSource,

    /// Content bundle for the static source (supports ~ expansion)
    #[serde(default = "default_bundle_path")]
    pub bundle_path: PathBuf,

    /// Base URL for the http source
    #[serde(default)]
    pub base_url: String,

    /// Request timeout for the http source
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Canvas web app loaded on the first canvas turn
    #[serde(default)]
    pub immersive_url: String,

    /// Pause inserted between merged speech fragments
    #[serde(default = "default_ssml_break_ms")]
    pub ssml_break_ms: u64,

    /// Fixed RNG seed; every turn draws the same sequence when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("~/.persona")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_content_source() -> ContentSource {
    ContentSource::Static
}

fn default_bundle_path() -> PathBuf {
    PathBuf::from("~/.persona/content.json")
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_ssml_break_ms() -> u64 {
    DEFAULT_BREAK_MS
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            data_dir: default_data_dir(),
            debug_info: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port` for the listener
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            source: default_content_source(),
            bundle_path: default_bundle_path(),
            base_url: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            immersive_url: String::new(),
            ssml_break_ms: default_ssml_break_ms(),
            rng_seed: None,
        }
    }
}

impl QuizConfig {
    /// Per-turn settings handed to every conversation
    pub fn turn_settings(&self) -> TurnSettings {
        TurnSettings {
            immersive_url: self.immersive_url.clone(),
            ssml: Ssml::new(self.ssml_break_ms),
        }
    }
}

impl Config {
    /// Load the configuration from ~/.persona/config.toml, writing defaults on first run
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process(path.parent())?;

        Ok(config)
    }

    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(&Self::default())
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        let mut config = Self::default();
        config.validate_and_process(path.parent())?;
        Ok(config)
    }

    fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".persona").join("config.toml"))
    }

    /// Validate values and expand paths
    ///
    /// `base_dir` anchors a relative `bundle_path`; it is the directory of
    /// the config file when there is one.
    fn validate_and_process(&mut self, base_dir: Option<&Path>) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if self.server.port == 0 {
            return Err(EngineError::Config("server.port must not be 0".to_string()));
        }

        if self.content.source == ContentSource::Http {
            let url = self.content.base_url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(EngineError::Config(format!(
                    "content.base_url must be an http(s) URL when source is http, got '{}'",
                    self.content.base_url
                )));
            }
            if self.content.timeout_secs == 0 {
                return Err(EngineError::Config(
                    "content.timeout_secs must be at least 1".to_string(),
                ));
            }
        }

        self.core.data_dir = expand_path(&self.core.data_dir)?;
        let bundle_path = expand_path(&self.content.bundle_path)?;
        self.content.bundle_path = match base_dir {
            Some(base) if bundle_path.is_relative() => base.join(bundle_path),
            _ => bundle_path,
        };

        Ok(())
    }

    /// Open the configured content store
    pub fn build_store(&self) -> Result<Arc<dyn ContentStore>, EngineError> {
        match self.content.source {
            ContentSource::Static => Ok(Arc::new(StaticContentStore::from_path(
                &self.content.bundle_path,
            )?)),
            ContentSource::Http => Ok(Arc::new(HttpContentStore::new(
                self.content.base_url.trim_end_matches('/'),
                Duration::from_secs(self.content.timeout_secs),
            )?)),
        }
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();

        assert_eq!(config.core.log_level, "info");
        assert_eq!(config.server.address(), "127.0.0.1:8080");
        assert_eq!(config.content.source, ContentSource::Static);
        assert_eq!(config.quiz.ssml_break_ms, DEFAULT_BREAK_MS);
        assert!(config.quiz.rng_seed.is_none());
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test");
        let expanded = expand_path(&path).unwrap();

        let home = dirs::home_dir().unwrap();
        assert_eq!(expanded, home.join("test"));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let path = PathBuf::from("/absolute/path");
        assert_eq!(expand_path(&path).unwrap(), path);
    }

    #[test]
    fn test_sections_are_optional() {
        let config: Config = toml::from_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.content.timeout_secs, 10);
    }

    #[test]
    fn test_http_source_needs_url() {
        let mut config: Config = toml::from_str("[content]\nsource = \"http\"\n").unwrap();
        let err = config.validate_and_process(None).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));

        config.content.base_url = "https://content.example.com".to_string();
        assert!(config.validate_and_process(None).is_ok());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = Config::default();
        config.core.log_level = "loud".to_string();
        assert!(config.validate_and_process(None).is_err());
    }

    #[test]
    fn test_relative_bundle_resolves_against_config_dir() {
        let mut config: Config = toml::from_str("[content]\nbundle_path = \"quiz.json\"\n").unwrap();
        config
            .validate_and_process(Some(Path::new("/etc/persona")))
            .unwrap();
        assert_eq!(
            config.content.bundle_path,
            PathBuf::from("/etc/persona/quiz.json")
        );
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_string = toml::to_string(&config).unwrap();

        let deserialized: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(config.core.log_level, deserialized.core.log_level);
        assert_eq!(config.server.port, deserialized.server.port);
    }
}
