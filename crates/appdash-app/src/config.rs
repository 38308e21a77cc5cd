//! Dashboard configuration file

use std::path::Path;

use anyhow::{Context, Result};
use appdash_data::IngestConfig;
use appdash_views::ViewSettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Default tracing filter, e.g. `info` or `appdash_data=debug`
    pub log_level: String,
    pub ingest: IngestConfig,
    pub view: ViewSettings,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            ingest: IngestConfig::default(),
            view: ViewSettings::default(),
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file
    ///
    /// Returns `Ok(None)` when the file does not exist so the caller can fall
    /// back to defaults; a file that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(Some(config))
    }
}
