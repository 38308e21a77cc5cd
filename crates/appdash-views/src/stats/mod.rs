//! Summary statistics over the current dataset

mod instances;
mod ports;

pub use instances::{
    filtered_summary, instance_detail, instance_summaries, running_count, FilteredSummary, InstanceDetail,
    InstanceSummary,
};
pub use ports::{parse_ports, port_usages, top_ports, Port, PortUsage};

use appdash_core::records::{ApplicationRecord, Dataset, RecordField};
use indexmap::IndexMap;
use serde::Serialize;

/// Occurrences per distinct value, in first-encountered order
pub type ValueCounts = IndexMap<String, usize>;

/// Headline metrics shown on the overview page
///
/// Instances are counted by id; the busiest instance is reported by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub total_instances: usize,
    pub total_applications: usize,
    pub unique_app_types: usize,
    /// Rounded to one decimal, 0 for an empty dataset
    pub avg_apps_per_instance: f64,
    pub app_type_counts: ValueCounts,
    pub most_used_app_type: Option<String>,
    pub busiest_instance: Option<String>,
}

/// Compute the overview metrics
///
/// Pure: the same dataset always yields the same metrics. Ties for the most
/// used type and the busiest instance go to the value seen first.
pub fn summarize(dataset: &Dataset) -> Metrics {
    let type_counts = value_counts(dataset, RecordField::AppType);
    let instance_counts = value_counts(dataset, RecordField::InstanceName);

    let total_instances = value_counts(dataset, RecordField::InstanceId).len();
    let total_applications = dataset.len();
    let avg_apps_per_instance = if total_instances == 0 {
        0.0
    } else {
        round1(total_applications as f64 / total_instances as f64)
    };

    Metrics {
        total_instances,
        total_applications,
        unique_app_types: type_counts.len(),
        avg_apps_per_instance,
        most_used_app_type: top_entry(&type_counts).map(|(value, _)| value.to_string()),
        busiest_instance: top_entry(&instance_counts).map(|(value, _)| value.to_string()),
        app_type_counts: type_counts,
    }
}

/// Count the values of one column
pub fn value_counts<'a, I>(records: I, field: RecordField) -> ValueCounts
where
    I: IntoIterator<Item = &'a ApplicationRecord>,
{
    let mut counts = ValueCounts::new();
    for record in records {
        *counts.entry(record.field(field).to_string()).or_insert(0) += 1;
    }
    counts
}

/// Entries by descending count; equal counts keep first-encountered order
pub fn ranked(counts: &ValueCounts) -> Vec<(&str, usize)> {
    let mut entries: Vec<_> = counts.iter().map(|(value, count)| (value.as_str(), *count)).collect();
    // sort_by is stable
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
}

/// The value with the highest count, first-encountered on ties
pub fn top_entry(counts: &ValueCounts) -> Option<(&str, usize)> {
    counts.iter().fold(None, |best, (value, count)| match best {
        Some((_, best_count)) if best_count >= *count => best,
        _ => Some((value.as_str(), *count)),
    })
}

/// Status distribution, ranked; `None` when no record carries a status
pub fn status_counts(dataset: &Dataset) -> Option<ValueCounts> {
    if !dataset.has_status() {
        return None;
    }
    let counts = value_counts(dataset, RecordField::AppStatus);
    Some(
        ranked(&counts)
            .into_iter()
            .map(|(value, count)| (value.to_string(), count))
            .collect(),
    )
}

/// One decimal place; exact ties go to the even digit (1.25 -> 1.2)
fn round1(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}
