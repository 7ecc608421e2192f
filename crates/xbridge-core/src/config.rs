//! Settings kept between runs.
//!
//! A single JSON file under the platform config directory. Every field has
//! a default, so older or hand-edited files still load.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{Asset, Chain};

/// Number of receivers remembered.
pub const MAX_RECENT_RECEIVERS: usize = 10;

/// Shortest pause between receipt polls.
pub const MIN_RECEIPT_POLL_SECS: u64 = 1;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no home directory to store the config in")]
    NoConfigDir,
}

/// Color scheme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeConfig {
    /// Follow the terminal background.
    #[default]
    System,
    Light,
    Dark,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub theme: ThemeConfig,
    /// RPC endpoints replacing the dictionary defaults.
    pub rpc_overrides: BTreeMap<Chain, String>,
    /// Bridge dictionary file replacing the bundled one.
    pub dictionary_path: Option<PathBuf>,
    /// Most recent last.
    pub recent_receivers: Vec<String>,
    pub last_asset: Option<Asset>,
    pub receipt_poll_secs: u64,
    pub receipt_attempts: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            theme: ThemeConfig::default(),
            rpc_overrides: BTreeMap::new(),
            dictionary_path: None,
            recent_receivers: Vec::new(),
            last_asset: None,
            receipt_poll_secs: 5,
            receipt_attempts: 120,
        }
    }
}

impl AppConfig {
    /// Remember a receiver. Moves an existing entry to the end.
    pub fn remember_receiver(&mut self, receiver: &str) {
        self.recent_receivers.retain(|r| r != receiver);
        self.recent_receivers.push(receiver.to_string());
        let excess = self
            .recent_receivers
            .len()
            .saturating_sub(MAX_RECENT_RECEIVERS);
        self.recent_receivers.drain(..excess);
    }

    pub fn last_receiver(&self) -> Option<&str> {
        self.recent_receivers.last().map(String::as_str)
    }

    pub fn rpc_override(&self, chain: Chain) -> Option<&str> {
        self.rpc_overrides.get(&chain).map(String::as_str)
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn read_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str::<Self>(&content)?.sanitized()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Pull hand-edited polling settings back into a usable range.
    fn sanitized(mut self) -> Self {
        if self.receipt_poll_secs < MIN_RECEIPT_POLL_SECS {
            tracing::warn!(
                "receipt_poll_secs {} too small, using {}",
                self.receipt_poll_secs,
                MIN_RECEIPT_POLL_SECS
            );
            self.receipt_poll_secs = MIN_RECEIPT_POLL_SECS;
        }
        self.receipt_attempts = self.receipt_attempts.max(1);
        self
    }

    /// Write through a temporary sibling so a crash never leaves half a file.
    pub fn write_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, serde_json::to_vec_pretty(self)?)?;
        fs::rename(&staging, path)?;
        Ok(())
    }
}

/// Location of the config file for this platform.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("xyz", "xbridge", "xbridge").ok_or(ConfigError::NoConfigDir)?;
    Ok(dirs.config_dir().join(CONFIG_FILE))
}

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::read_from(&config_path()?)
}

pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    let path = config_path()?;
    config.write_to(&path)?;
    tracing::debug!("Saved config to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("xbridge-config-test-{}-{}", std::process::id(), name))
            .join(CONFIG_FILE)
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.theme, ThemeConfig::System);
        assert!(config.rpc_overrides.is_empty());
        assert_eq!(config.last_receiver(), None);
        assert_eq!(config.receipt_poll_secs, 5);
        assert_eq!(config.receipt_attempts, 120);
    }

    #[test]
    fn test_remember_receiver_moves_to_end() {
        let mut config = AppConfig::default();
        config.remember_receiver("0xA");
        config.remember_receiver("0xB");
        config.remember_receiver("0xA");
        assert_eq!(config.recent_receivers, vec!["0xB", "0xA"]);
        assert_eq!(config.last_receiver(), Some("0xA"));
    }

    #[test]
    fn test_remember_receiver_is_capped() {
        let mut config = AppConfig::default();
        for i in 0..15 {
            config.remember_receiver(&format!("0x{:02}", i));
        }
        assert_eq!(config.recent_receivers.len(), MAX_RECENT_RECEIVERS);
        assert_eq!(config.recent_receivers[0], "0x05");
        assert_eq!(config.last_receiver(), Some("0x14"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"theme":"dark","rpc_overrides":{"RSK":"http://localhost:4444"}}"#)
                .unwrap();
        assert_eq!(config.theme, ThemeConfig::Dark);
        assert_eq!(config.rpc_override(Chain::Rsk), Some("http://localhost:4444"));
        assert_eq!(config.rpc_override(Chain::Eth), None);
        assert_eq!(config.receipt_attempts, 120);
    }

    #[test]
    fn test_missing_file_reads_as_default() {
        let path = scratch_path("missing");
        assert_eq!(AppConfig::read_from(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_write_then_read() {
        let path = scratch_path("write");
        let mut config = AppConfig::default();
        config.remember_receiver("0xABC");
        config.last_asset = Some(Asset::Sov);
        config.write_to(&path).unwrap();

        assert_eq!(AppConfig::read_from(&path).unwrap(), config);
        assert!(!path.with_extension("json.tmp").exists());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_zero_polling_is_clamped_on_load() {
        let path = scratch_path("clamp");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"receipt_poll_secs":0,"receipt_attempts":0}"#).unwrap();

        let config = AppConfig::read_from(&path).unwrap();
        assert_eq!(config.receipt_poll_secs, MIN_RECEIPT_POLL_SECS);
        assert_eq!(config.receipt_attempts, 1);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = scratch_path("malformed");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(AppConfig::read_from(&path), Err(ConfigError::Json(_))));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
