use serde::{Deserialize, Serialize};
use std::fmt;

mod engine;
mod filter;

pub use engine::NavigationEngine;
pub use filter::resolve;

use crate::records::RecordField;

/// Pages the dashboard can show
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Metrics, quick actions and chart data
    #[default]
    Overview,
    /// Per-instance breakdown
    InstanceDetails,
    /// Dataset narrowed by the active filter
    FilteredView,
    /// Searchable table of every record
    DataTable,
}

impl View {
    pub const ALL: [View; 4] = [
        View::Overview,
        View::InstanceDetails,
        View::FilteredView,
        View::DataTable,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            View::Overview => "Application Overview",
            View::InstanceDetails => "Instance Details",
            View::FilteredView => "Filtered View",
            View::DataTable => "Database Table",
        }
    }

    /// Short identifier accepted on the command line
    pub fn key(&self) -> &'static str {
        match self {
            View::Overview => "overview",
            View::InstanceDetails => "instance_details",
            View::FilteredView => "filtered_view",
            View::DataTable => "data_table",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|view| view.key() == key)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Record column a filter can narrow on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    AppType,
    Instance,
    AppStatus,
}

impl FilterField {
    /// The record column this filter compares against
    pub fn record_field(&self) -> RecordField {
        match self {
            FilterField::AppType => RecordField::AppType,
            FilterField::Instance => RecordField::InstanceName,
            FilterField::AppStatus => RecordField::AppStatus,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterField::AppType => "type",
            FilterField::Instance => "instance",
            FilterField::AppStatus => "status",
        }
    }
}

/// A single field/value predicate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter {
    pub field: FilterField,
    pub value: String,
}

impl Filter {
    pub fn new(field: FilterField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    pub fn app_type(value: impl Into<String>) -> Self {
        Self::new(FilterField::AppType, value)
    }

    pub fn instance(value: impl Into<String>) -> Self {
        Self::new(FilterField::Instance, value)
    }

    pub fn app_status(value: impl Into<String>) -> Self {
        Self::new(FilterField::AppStatus, value)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.field.label(), self.value)
    }
}

/// Discrete UI events driving the navigation state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationCommand {
    /// Switch page; a filter payload replaces the active filter in the same step
    NavigateTo { view: View, filter: Option<Filter> },
    /// Chart segment or quick action picked an application type
    SelectAppType(String),
    /// Chart bar or quick action picked an instance
    SelectInstance(String),
    /// Status chart picked a status
    SelectAppStatus(String),
    /// Drop the active filter, stay on the current page
    ClearFilter,
}

impl NavigationCommand {
    pub fn navigate(view: View) -> Self {
        NavigationCommand::NavigateTo { view, filter: None }
    }
}

/// Non-fatal outcome of a navigation command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationWarning {
    /// The dataset carries no status information; the unfiltered dataset is shown
    FilterUnavailable { field: FilterField, value: String },
}

impl fmt::Display for NavigationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationWarning::FilterUnavailable { field, value } => write!(
                f,
                "No {} information available to filter on '{}'. Showing all applications.",
                field.label(),
                value
            ),
        }
    }
}

/// Snapshot of the navigation state handed to views
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationContext {
    pub current_view: View,
    pub active_filter: Option<Filter>,
}
