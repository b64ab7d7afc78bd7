//! Configuration management for textenhance.
//!
//! Configuration is loaded from `~/.config/textenhance/config.toml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Enhancement endpoint settings.
    #[serde(default)]
    pub endpoint: EndpointConfig,
    /// Terminal UI settings.
    #[serde(default)]
    pub ui: UiConfig,
}

/// Where and how to reach the enhancement endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL (default: http://localhost:3000).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request path (default: /api/enhance-text).
    #[serde(default = "default_path")]
    pub path: String,
    /// Request timeout in seconds; 0 disables the timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            path: default_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_path() -> String {
    "/api/enhance-text".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl EndpointConfig {
    /// Full URL the request is posted to.
    pub fn url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.path.starts_with('/') {
            format!("{}{}", base, self.path)
        } else {
            format!("{}/{}", base, self.path)
        }
    }

    /// Request timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Terminal UI preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Redraw interval while idle or pending, in milliseconds.
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
    /// Show the instruction prompt of the selected action under the buttons.
    #[serde(default = "default_true")]
    pub show_prompt: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate_ms(),
            show_prompt: true,
        }
    }
}

fn default_tick_rate_ms() -> u64 {
    100
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Get the config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("textenhance"))
            .context("Could not determine config directory")
    }

    /// Get the config file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get the log file path used while the TUI owns the terminal.
    pub fn log_path() -> Result<PathBuf> {
        dirs::cache_dir()
            .map(|p| p.join("textenhance").join("textenhance.log"))
            .context("Could not determine cache directory")
    }

    /// Load configuration from file, using defaults if not found.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply a command-line endpoint override.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.endpoint.base_url = url;
        }
        self
    }
}
