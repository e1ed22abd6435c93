// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{APP_CONFIG_DIR, CONFIG_FILE_NAME, data};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Locations of the documents a settings session is built from
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Setting declarations (JSON array)
    pub declarations: PathBuf,
    /// Dependency rules (JSON object keyed by driver)
    pub rules: PathBuf,
    /// Supported values of the active camera
    pub capabilities: PathBuf,
    /// Stored user preferences; a missing file means none were stored
    pub preferences: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            declarations: PathBuf::from(data::DECLARATIONS),
            rules: PathBuf::from(data::RULES),
            capabilities: PathBuf::from(data::CAPABILITIES),
            preferences: PathBuf::from(data::PREFERENCES),
        }
    }
}

impl Config {
    /// Default location: `<config_dir>/camera-settings/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_CONFIG_DIR).join(CONFIG_FILE_NAME))
    }

    pub fn from_json(json: &str) -> AppResult<Self> {
        serde_json::from_str(json).map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json(&json)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load the user's configuration, falling back to the bundled files
    pub fn load() -> AppResult<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                debug!("No configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }
}
