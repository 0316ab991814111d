use anyhow::{Context, Result};
use clustersmgmt::{DEFAULT_TIMEOUT, DEFAULT_URL, HttpConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Get the config directory path (~/.config/oidc-provisioner)
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("oidc-provisioner"))
}

/// Get the config file path
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Expand `~` in a configured path
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Settings read from config.toml
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub state: StateSettings,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// clusters_mgmt API URL
    pub url: Option<String>,
    /// Bearer token
    pub token: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StateSettings {
    /// State file location
    pub path: Option<String>,
}

impl Settings {
    /// Load settings from ~/.config/oidc-provisioner/config.toml, or defaults if
    /// the file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("Config file {} does not exist, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))
    }

    /// Transport configuration; `url` and `token` come from flags or the
    /// environment and win over the file
    pub fn http_config(&self, url: Option<&str>, token: Option<&str>) -> HttpConfig {
        let non_empty = |s: &&str| !s.trim().is_empty();

        HttpConfig {
            url: url
                .filter(non_empty)
                .or(self.api.url.as_deref())
                .unwrap_or(DEFAULT_URL)
                .to_string(),
            token: token
                .filter(non_empty)
                .or(self.api.token.as_deref())
                .map(str::to_string),
            timeout: Some(
                self.api
                    .timeout_secs
                    .map_or(DEFAULT_TIMEOUT, Duration::from_secs),
            ),
            ..HttpConfig::default()
        }
    }

    /// State file location: flag, then config file, then the default
    pub fn state_path(&self, flag: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = flag {
            return Ok(path.to_path_buf());
        }
        match &self.state.path {
            Some(path) => Ok(expand_path(path)),
            None => crate::state::ProvisionerState::default_path(),
        }
    }
}
