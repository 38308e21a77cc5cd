//! Page models, one per navigation view
//!
//! [`build_page`] reads the session state and assembles everything the
//! current view displays. Pages never mutate state; the commands they carry
//! (quick actions, chart clicks) go back through [`AppState::dispatch`].

use appdash_core::navigation::{resolve, Filter, NavigationCommand, NavigationWarning, View};
use appdash_core::records::{ApplicationRecord, RecordField};
use appdash_core::state::AppState;
use serde::Serialize;

use crate::plots::{heatmap, overview_charts, Heatmap, OverviewCharts};
use crate::stats::{
    filtered_summary, instance_detail, instance_summaries, running_count, summarize, FilteredSummary, InstanceDetail,
    InstanceSummary, Metrics,
};
use crate::tables::TableQuery;
use crate::ViewSettings;

/// Button on the overview page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickAction {
    pub label: String,
    pub command: NavigationCommand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewPage {
    pub metrics: Metrics,
    pub charts: OverviewCharts,
    pub quick_actions: Vec<QuickAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceDetailsPage {
    pub instances: Vec<InstanceSummary>,
    pub selected: Option<InstanceDetail>,
    pub type_matrix: Heatmap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredPage {
    /// Filter actually applied; `None` shows the whole dataset
    pub filter: Option<Filter>,
    pub summary: FilteredSummary,
    pub records: Vec<ApplicationRecord>,
    pub warning: Option<NavigationWarning>,
}

impl FilteredPage {
    pub fn heading(&self) -> String {
        match &self.filter {
            Some(filter) => format!("Filtered by {}: {}", filter.field.label(), filter.value),
            None => "All Applications".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataTablePage {
    pub query: TableQuery,
    /// Records in the dataset before the query
    pub total: usize,
    pub records: Vec<ApplicationRecord>,
    /// Counts over the rows the query kept
    pub summary: FilteredSummary,
    pub running: usize,
    /// Choices for the type select, first-encountered order
    pub type_options: Vec<String>,
    /// Choices for the instance select, first-encountered order
    pub instance_options: Vec<String>,
}

impl DataTablePage {
    pub fn caption(&self) -> String {
        format!("Showing {} of {} applications", self.records.len(), self.total)
    }
}

/// Model of the page to display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Page {
    /// No dataset loaded yet
    Welcome,
    Overview(OverviewPage),
    InstanceDetails(InstanceDetailsPage),
    FilteredView(FilteredPage),
    DataTable(DataTablePage),
}

/// Page-local inputs that are not part of navigation state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Instance picked on the details page; defaults to the first one
    pub instance: Option<String>,
    pub query: TableQuery,
}

/// Build the model of the current view
pub fn build_page(state: &AppState, request: &PageRequest, settings: &ViewSettings) -> Page {
    if !state.has_data() {
        return Page::Welcome;
    }

    match state.context().current_view {
        View::Overview => Page::Overview(overview_page(state, settings)),
        View::InstanceDetails => Page::InstanceDetails(instance_details_page(state, request, settings)),
        View::FilteredView => Page::FilteredView(filtered_page(state)),
        View::DataTable => Page::DataTable(data_table_page(state, &request.query, settings)),
    }
}

fn overview_page(state: &AppState, settings: &ViewSettings) -> OverviewPage {
    let metrics = summarize(state.dataset());
    let mut quick_actions = vec![
        QuickAction {
            label: "View All Data".to_string(),
            command: NavigationCommand::navigate(View::DataTable),
        },
        QuickAction {
            label: "Instance Analysis".to_string(),
            command: NavigationCommand::navigate(View::InstanceDetails),
        },
    ];
    if let Some(app_type) = &metrics.most_used_app_type {
        quick_actions.push(QuickAction {
            label: format!("View {} Apps", app_type),
            command: NavigationCommand::SelectAppType(app_type.clone()),
        });
    }
    if let Some(instance) = &metrics.busiest_instance {
        quick_actions.push(QuickAction {
            label: format!("Busiest Instance: {}", instance),
            command: NavigationCommand::SelectInstance(instance.clone()),
        });
    }

    OverviewPage {
        charts: overview_charts(state.dataset(), settings),
        metrics,
        quick_actions,
    }
}

fn instance_details_page(state: &AppState, request: &PageRequest, settings: &ViewSettings) -> InstanceDetailsPage {
    let dataset = state.dataset();
    let instances = instance_summaries(dataset);
    let name = request
        .instance
        .clone()
        .or_else(|| instances.first().map(|summary| summary.instance_name.clone()));

    InstanceDetailsPage {
        selected: name.and_then(|name| instance_detail(dataset, &name, settings)),
        type_matrix: heatmap::type_matrix(dataset),
        instances,
    }
}

/// A status filter on a dataset without status data degrades to no filter
fn filtered_page(state: &AppState) -> FilteredPage {
    let dataset = state.dataset();
    let requested = state.navigation().active_filter();

    let (filter, warning) = match requested {
        Some(filter) if !filter.is_available(dataset) => (
            None,
            Some(NavigationWarning::FilterUnavailable {
                field: filter.field,
                value: filter.value.clone(),
            }),
        ),
        other => (other.cloned(), None),
    };

    let records = resolve(dataset, filter.as_ref());
    FilteredPage {
        summary: filtered_summary(&records),
        records: records.into_iter().cloned().collect(),
        filter,
        warning,
    }
}

fn data_table_page(state: &AppState, query: &TableQuery, settings: &ViewSettings) -> DataTablePage {
    let dataset = state.dataset();
    let options = |field: RecordField| -> Vec<String> { dataset.distinct(field).into_iter().map(str::to_string).collect() };
    let rows = query.apply(dataset);

    DataTablePage {
        query: query.clone(),
        total: dataset.len(),
        summary: filtered_summary(&rows),
        running: running_count(rows.iter().copied(), &settings.running_status),
        records: rows.into_iter().cloned().collect(),
        type_options: options(RecordField::AppType),
        instance_options: options(RecordField::InstanceName),
    }
}
