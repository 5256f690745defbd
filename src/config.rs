//! Persistent scan defaults.
//!
//! An optional JSON file under the platform config directory supplies
//! defaults for the scan options, so habitual flags don't need repeating.
//! CLI flags always win over the file. A missing or malformed file falls
//! back to the built-in defaults with a debug log, never an error.
//!
//! ```json
//! {
//!     "skip_hidden": true,
//!     "extensions": ["jpg", "png"],
//!     "min_size": 1024
//! }
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Default scan options loaded from the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Skip dotfiles and hidden entries.
    #[serde(default)]
    pub skip_hidden: bool,

    /// Follow symbolic links.
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Keep singleton sets in the results.
    #[serde(default)]
    pub keep_singletons: bool,

    /// Inclusive minimum file size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u64>,

    /// Inclusive maximum file size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,

    /// Extensions to admit (empty admits everything).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
}

impl Config {
    /// Load the configuration from the default platform-specific path.
    #[must_use]
    pub fn load() -> Self {
        match Self::load_internal() {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Failed to load config, using defaults: {e}");
                Self::default()
            }
        }
    }

    fn load_internal() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save the configuration to the default platform-specific path.
    ///
    /// # Errors
    ///
    /// Fails when the config directory cannot be determined or written.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "dupehunt", "dupehunt")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(dirs.config_dir().join("config.json"))
    }
}
