//! CLI configuration module
//!
//! Flat JSON key-value configuration persisted as a dotfile in the working
//! directory. A missing or unreadable file is never fatal; the config just
//! starts empty.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::engine::DEFAULT_ENGINE_URL;

/// Default config file in the working directory
pub const CONFIG_FILE: &str = ".torrent-relay.conf";

/// Default download destination
pub const DEFAULT_DOWNLOAD_PATH: &str = "downloads";

/// Environment variable consulted for the Drive access token
pub const TOKEN_ENV_VAR: &str = "GDRIVE_ACCESS_TOKEN";

/// Flat key-value configuration store
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl ConfigStore {
    /// Load configuration from the given file
    ///
    /// Missing or unreadable files yield an empty config.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(values) => {
                    debug!("Loaded config from {}", path.display());
                    values
                }
                Err(e) => {
                    warn!("Could not parse config file {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) => {
                debug!("No config file at {}: {}", path.display(), e);
                HashMap::new()
            }
        };
        Self { path, values }
    }

    /// Load configuration from the default dotfile
    pub fn load_default() -> Self {
        Self::load(CONFIG_FILE)
    }

    /// Get a configuration value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set a configuration value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Persist the configuration
    pub fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, contents)?;
        info!("Configuration saved to {}", self.path.display());
        Ok(())
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Default download destination directory
    pub fn download_path(&self) -> PathBuf {
        self.get("download_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_PATH))
    }

    /// Endpoint of the transfer engine daemon
    pub fn engine_url(&self) -> String {
        self.get("engine_url")
            .unwrap_or(DEFAULT_ENGINE_URL)
            .to_string()
    }

    /// Resolve the Drive access token: environment first, then config
    pub fn drive_token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV_VAR)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.get("drive_token").map(str::to_string))
    }
}
