//! Category series for pie and bar charts

use std::collections::BTreeMap;

use appdash_core::navigation::NavigationCommand;
use appdash_core::records::{Dataset, RecordField};
use serde::Serialize;

use crate::stats::{ranked, status_counts, value_counts};

/// What a series counts, which also decides what a click on it selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    AppTypes,
    AppsPerInstance,
    Statuses,
    TypeDiversity,
}

impl SeriesKind {
    pub fn title(&self) -> &'static str {
        match self {
            SeriesKind::AppTypes => "Application Types Distribution",
            SeriesKind::AppsPerInstance => "Applications per Instance",
            SeriesKind::Statuses => "Application Status Distribution",
            SeriesKind::TypeDiversity => "App Type Diversity per Instance",
        }
    }

    /// Command issued when the category `label` is clicked
    pub fn select(&self, label: &str) -> NavigationCommand {
        match self {
            SeriesKind::AppTypes => NavigationCommand::SelectAppType(label.to_string()),
            SeriesKind::AppsPerInstance | SeriesKind::TypeDiversity => {
                NavigationCommand::SelectInstance(label.to_string())
            }
            SeriesKind::Statuses => NavigationCommand::SelectAppStatus(label.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarSeries {
    pub kind: SeriesKind,
    pub bars: Vec<Bar>,
}

impl BarSeries {
    fn new<I, S>(kind: SeriesKind, bars: I) -> Self
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        Self {
            kind,
            bars: bars
                .into_iter()
                .map(|(label, value)| Bar {
                    label: label.into(),
                    value,
                })
                .collect(),
        }
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn total(&self) -> usize {
        self.bars.iter().map(|bar| bar.value).sum()
    }

    /// Share of the total held by bar `index`, in percent
    pub fn share(&self, index: usize) -> Option<f64> {
        let bar = self.bars.get(index)?;
        let total = self.total();
        (total > 0).then(|| bar.value as f64 * 100.0 / total as f64)
    }

    /// Command for a click on bar `index`
    pub fn select(&self, index: usize) -> Option<NavigationCommand> {
        self.bars.get(index).map(|bar| self.kind.select(&bar.label))
    }
}

/// App types by descending count
pub fn app_type_distribution(dataset: &Dataset) -> BarSeries {
    let counts = value_counts(dataset, RecordField::AppType);
    BarSeries::new(SeriesKind::AppTypes, ranked(&counts))
}

/// Record count per instance, instances sorted by name
pub fn apps_per_instance(dataset: &Dataset) -> BarSeries {
    let counts = value_counts(dataset, RecordField::InstanceName);
    let sorted: BTreeMap<_, _> = counts.into_iter().collect();
    BarSeries::new(SeriesKind::AppsPerInstance, sorted)
}

/// Status counts; `None` when no record carries a status
pub fn status_distribution(dataset: &Dataset) -> Option<BarSeries> {
    status_counts(dataset).map(|counts| BarSeries::new(SeriesKind::Statuses, counts))
}

/// Distinct app types per instance, instances sorted by name
pub fn type_diversity(dataset: &Dataset) -> BarSeries {
    let mut types: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for record in dataset {
        let seen = types.entry(record.instance_name.as_str()).or_default();
        if !seen.contains(&record.app_type.as_str()) {
            seen.push(&record.app_type);
        }
    }
    BarSeries::new(
        SeriesKind::TypeDiversity,
        types.into_iter().map(|(instance, types)| (instance, types.len())),
    )
}
