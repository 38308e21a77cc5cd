//! Chart data for the overview and instance pages
//!
//! Each builder returns plain series or matrices. Series know which
//! navigation command a click on one of their categories issues.

pub mod bar;
pub mod heatmap;
pub mod treemap;

pub use bar::{Bar, BarSeries, SeriesKind};
pub use heatmap::{Heatmap, PortTypeCount};
pub use treemap::TreeNode;

use appdash_core::records::Dataset;
use serde::Serialize;

use crate::ViewSettings;

/// Every chart of the overview page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewCharts {
    pub app_types: BarSeries,
    pub apps_per_instance: BarSeries,
    pub statuses: Option<BarSeries>,
    pub type_diversity: BarSeries,
    pub port_heatmap: Option<Heatmap>,
    pub ports_by_type: Vec<PortTypeCount>,
    pub hierarchy: TreeNode,
}

pub fn overview_charts(dataset: &Dataset, settings: &ViewSettings) -> OverviewCharts {
    OverviewCharts {
        app_types: bar::app_type_distribution(dataset),
        apps_per_instance: bar::apps_per_instance(dataset),
        statuses: bar::status_distribution(dataset),
        type_diversity: bar::type_diversity(dataset),
        port_heatmap: heatmap::port_heatmap(dataset, settings.top_ports),
        ports_by_type: heatmap::ports_by_type(dataset),
        hierarchy: treemap::hierarchy(dataset),
    }
}
