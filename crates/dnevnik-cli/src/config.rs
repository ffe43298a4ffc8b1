//! Command-line configuration management.
//!
//! This module handles loading and saving the CLI configuration, which
//! includes the last used login, the auto-logout preference and which
//! credential store to use.
//!
//! Configuration is stored at `~/.config/dnevnik/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Application name used for config directory paths
const APP_NAME: &str = "dnevnik";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Where credentials are persisted between runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub last_login: Option<String>,
    #[serde(default)]
    pub auto_logout: bool,
    #[serde(default)]
    pub store: StoreBackend,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_for_missing_fields() {
        let config: Config = serde_json::from_str(r#"{"last_login": "ivanov"}"#).unwrap();
        assert_eq!(config.last_login.as_deref(), Some("ivanov"));
        assert!(!config.auto_logout);
        assert_eq!(config.store, StoreBackend::File);
    }

    #[test]
    fn test_store_backend_serializes_lowercase() {
        let config = Config {
            last_login: None,
            auto_logout: true,
            store: StoreBackend::Keyring,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""store":"keyring""#));
    }
}
