//! Canvass configuration
//!
//! Config file: ~/.config/canvass/config.toml or /etc/canvass/config.toml
//!
//! Environment overrides (applied after the file):
//! - CANVASS_SERVER_URL
//! - CANVASS_DEVICE_ID
//! - CANVASS_FORM_ID

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL, registration paths are appended to it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Who is canvassing and with which form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasserConfig {
    #[serde(default)]
    pub device_id: Option<String>,

    #[serde(default)]
    pub form_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvassConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub canvasser: CanvasserConfig,
}

impl CanvassConfig {
    /// Get default user config path: ~/.config/canvass/config.toml
    pub fn user_config_path() -> Result<PathBuf> {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return Ok(Path::new(&xdg).join("canvass").join("config.toml"));
        }

        let home = std::env::var("HOME").context("Cannot determine home directory")?;
        Ok(Path::new(&home)
            .join(".config")
            .join("canvass")
            .join("config.toml"))
    }

    /// Get system config path: /etc/canvass/config.toml
    pub fn system_config_path() -> PathBuf {
        PathBuf::from("/etc/canvass/config.toml")
    }

    /// Load configuration
    ///
    /// Priority:
    /// 1. User config
    /// 2. System config
    /// 3. Defaults
    ///
    /// Environment overrides are applied on top.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env();
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        if let Ok(user_path) = Self::user_config_path() {
            if user_path.exists() {
                return Self::load_from_path(&user_path);
            }
        }

        let system_path = Self::system_config_path();
        if system_path.exists() {
            return Self::load_from_path(&system_path);
        }

        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: CanvassConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("CANVASS_SERVER_URL") {
            self.server.base_url = url;
        }
        if let Some(id) = lookup("CANVASS_DEVICE_ID") {
            self.canvasser.device_id = Some(id);
        }
        if let Some(id) = lookup("CANVASS_FORM_ID") {
            self.canvasser.form_id = Some(id);
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}
