//! Persisted TUI preferences, loaded from `~/.config/hangul-ime/config.toml`
//! if present, written out with defaults otherwise. Uses synchronous
//! `std::fs` since this crate has no async runtime.

use std::path::PathBuf;

use color_eyre::eyre::{eyre, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    TwoBulsik,
    ThreeBulsik,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub default_layout: Layout,
}

impl Default for Config {
    fn default() -> Self {
        Self { default_layout: Layout::TwoBulsik }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Ok(toml::from_str(&content)?)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    fn config_file_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().ok_or_else(|| eyre!("could not find home directory"))?;
        Ok(home_dir.join(".config").join("hangul-ime").join("config.toml"))
    }
}
