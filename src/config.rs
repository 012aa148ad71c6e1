//! Application configuration management.
//!
//! Holds the asset-cache settings (base URL and generation tag) and resolves
//! the platform data and cache directories.
//!
//! Configuration is stored at `~/.config/estatedesk/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::cache::Asset;

/// Application name used for config/data/cache directory paths
const APP_NAME: &str = "estatedesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Cache generation seeded when the config does not name one. Bump this tag
/// to invalidate previously cached assets.
const DEFAULT_GENERATION: &str = "estatedesk-v2";

/// Static assets the offline cache carries. Must stay in sync with what the
/// asset host actually serves.
const ASSET_MANIFEST: [&str; 6] = [
    "index.html",
    "style.css",
    "app.js",
    "manifest.json",
    "logo-192.png",
    "logo-512.png",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Base URL the asset manifest is fetched from.
    pub asset_base: Option<String>,
    /// Overrides the built-in cache generation tag.
    pub cache_generation: Option<String>,
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
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the persisted collections.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir =
            dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Root directory for offline asset cache generations.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir =
            dirs::cache_dir().ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join("assets"))
    }

    pub fn generation(&self) -> &str {
        self.cache_generation.as_deref().unwrap_or(DEFAULT_GENERATION)
    }

    /// The enumerated asset list resolved against the configured base URL.
    pub fn asset_manifest(&self) -> Result<Vec<Asset>> {
        let base = self
            .asset_base
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("asset_base is not configured"))?;
        let base = base.trim_end_matches('/');
        Ok(ASSET_MANIFEST
            .iter()
            .map(|name| Asset::new(*name, format!("{}/{}", base, name)))
            .collect())
    }
}
