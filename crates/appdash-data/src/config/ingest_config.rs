//! Settings applied while reading upload batches

use serde::{Deserialize, Serialize};

/// Configuration for one upload batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Largest accepted file in bytes, 0 for no limit
    pub max_file_bytes: usize,

    /// File extensions picked up when a directory is uploaded
    pub extensions: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 0,
            extensions: vec!["json".to_string()],
        }
    }
}

impl IngestConfig {
    /// Whether a path found while walking a directory belongs to the batch
    pub fn accepts(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}
