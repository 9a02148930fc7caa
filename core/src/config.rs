use crate::api::DEFAULT_BASE_URL;
use crate::error::{self, Result};
use serde_derive::{Deserialize, Serialize};
use snafu::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use strum_macros::{Display, EnumIter};

use tracing::{info, warn};

pub const BP_DATA_DIR: &str = "backup-panel";
pub const BP_CONF: &str = "config.json";
/// Overrides `base_url` for the running session without touching the file.
pub const BP_URL_ENV: &str = "BACKUP_PANEL_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default, Display, EnumIter)]
pub enum Style {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub default_limit: Option<u32>,
    #[serde(default = "default_typing_speed_ms")]
    pub typing_speed_ms: u64,
    #[serde(default = "default_status_hide_secs")]
    pub status_hide_secs: u64,
    #[serde(default)]
    pub accept_invalid_certs: bool,
    #[serde(default)]
    pub style: Style,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_limit: None,
            typing_speed_ms: default_typing_speed_ms(),
            status_hide_secs: default_status_hide_secs(),
            accept_invalid_certs: false,
            style: Style::default(),
        }
    }
}
impl Config {
    /// Load from the user config dir, writing defaults if nothing is there yet.
    pub fn load() -> Result<Config> {
        let mut config = Self::load_from(&Self::default_config_path())?;
        if let Ok(url) = std::env::var(BP_URL_ENV) {
            info!("Using {BP_URL_ENV}: {url}");
            config.base_url = url;
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Config> {
        if let Some(config_dir) = path.parent() {
            if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
                info!("Creating config directory: {}", config_dir.display());
                fs::create_dir_all(config_dir).context(error::ConfigWriteSnafu { path })?;
            }
        }
        let config = if path.exists() {
            let config_data = fs::read_to_string(path).context(error::ConfigLoadSnafu { path })?;
            if config_data.trim().is_empty() {
                info!("Empty config data, loading defaults to: {}", path.display());
                Config::default()
            } else {
                info!("Loading config data at: {}", path.display());
                serde_json::from_str(&config_data).context(error::ConfigParseSnafu { path })?
            }
        } else {
            info!("No config file, creating at: {}", path.display());
            Config::default()
        };

        // write defaults for immediate use
        config.save_to(path)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let config_str =
            serde_json::to_string_pretty(self).context(error::ConfigWriteFormatSnafu { path })?;
        fs::write(path, config_str).context(error::ConfigWriteSnafu { path })?;
        Ok(())
    }

    pub fn typing_speed(&self) -> Duration {
        Duration::from_millis(self.typing_speed_ms)
    }

    pub fn status_hide_delay(&self) -> Duration {
        Duration::from_secs(self.status_hide_secs)
    }

    fn default_config_dir() -> PathBuf {
        match dirs::config_dir() {
            Some(dir) => dir.join(BP_DATA_DIR),
            None => {
                warn!("No user config directory, using working directory");
                PathBuf::from(BP_DATA_DIR)
            }
        }
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(BP_CONF)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_typing_speed_ms() -> u64 {
    20
}
fn default_status_hide_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(BP_CONF);
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
        assert_eq!(config.typing_speed(), Duration::from_millis(20));
        assert_eq!(config.status_hide_delay(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(BP_CONF);
        fs::write(&path, r#"{"base_url": "http://panel:8080/api/v1", "default_limit": 10}"#)
            .unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_url, "http://panel:8080/api/v1");
        assert_eq!(config.default_limit, Some(10));
        assert_eq!(config.typing_speed_ms, 20);
        assert_eq!(config.style, Style::System);
    }

    #[test]
    fn test_empty_file_and_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(BP_CONF);
        fs::write(&path, "").unwrap();
        let mut config = Config::load_from(&path).unwrap();
        config.accept_invalid_certs = true;
        config.style = Style::Dark;
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(BP_CONF);
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
