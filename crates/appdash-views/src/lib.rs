//! View models for the instance application dashboard
//!
//! Everything here is plain data derived from the session state: summary
//! metrics, chart series, page models, table queries and exports. Drawing
//! them is left to whichever front end consumes the crate.

pub mod export;
pub mod pages;
pub mod plots;
pub mod stats;
pub mod tables;

pub use export::ExportFormat;
pub use pages::{build_page, Page, PageRequest};
pub use stats::{summarize, Metrics};
pub use tables::TableQuery;

use serde::{Deserialize, Serialize};

/// Presentation settings shared by every page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Ports shown in the heatmap and port rankings
    pub top_ports: usize,

    /// Status value counted as a running application
    pub running_status: String,

    /// Rows rendered before a table is truncated
    pub max_rows_displayed: usize,

    /// Indent JSON exports
    pub pretty_json: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            top_ports: 10,
            running_status: "running".to_string(),
            max_rows_displayed: 1000,
            pretty_json: true,
        }
    }
}
