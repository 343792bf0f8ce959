//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the document endpoint, the shell origin, the current
//! cache generation and the theme preference.
//!
//! Configuration is stored at `~/.config/campsync/config.json`.
//! `CAMPSYNC_API_BASE` and `CAMPSYNC_SHELL_ORIGIN` override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::session::Theme;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "campsync";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Endpoint used when nothing is configured (local worker dev server)
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8787";

/// Origin serving the built shell when nothing is configured
pub const DEFAULT_SHELL_ORIGIN: &str = "http://127.0.0.1:5173";

/// Cache generation tag. Bump when shipping a new shell.
pub const DEFAULT_CACHE_GENERATION: &str = "camp-shell-v4";

const ENV_API_BASE: &str = "CAMPSYNC_API_BASE";
const ENV_SHELL_ORIGIN: &str = "CAMPSYNC_SHELL_ORIGIN";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_generation: Option<String>,
    /// Unset means requests never time out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Root directory for cache generations and logs
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn api_base(&self) -> String {
        std::env::var(ENV_API_BASE)
            .ok()
            .or_else(|| self.api_base.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
    }

    pub fn shell_origin(&self) -> String {
        std::env::var(ENV_SHELL_ORIGIN)
            .ok()
            .or_else(|| self.shell_origin.clone())
            .unwrap_or_else(|| DEFAULT_SHELL_ORIGIN.to_string())
    }

    pub fn cache_generation(&self) -> &str {
        self.cache_generation
            .as_deref()
            .unwrap_or(DEFAULT_CACHE_GENERATION)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = Config::load_from(&dir.path().join("nope.json")).expect("load");
        assert_eq!(config, Config::default());
        assert_eq!(config.cache_generation(), DEFAULT_CACHE_GENERATION);
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            api_base: Some("https://camp.example.dev".to_string()),
            cache_generation: Some("camp-shell-v5".to_string()),
            request_timeout_secs: Some(20),
            theme: Some(Theme::Light),
            ..Default::default()
        };
        config.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded, config);
        assert_eq!(loaded.cache_generation(), "camp-shell-v5");
        assert_eq!(loaded.request_timeout(), Some(Duration::from_secs(20)));
    }
}
