//! Per-instance and filtered-subset summaries

use appdash_core::records::{ApplicationRecord, Dataset, RecordField};
use serde::Serialize;

use super::{ports, ranked, value_counts, Port};
use crate::ViewSettings;

/// One row of the instance summary table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceSummary {
    pub instance_name: String,
    /// Identifier of the first record seen for this instance
    pub instance_id: String,
    pub total_apps: usize,
    pub app_types: usize,
}

/// Everything the instance details page shows for one instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceDetail {
    pub instance_name: String,
    pub instance_id: String,
    pub total_apps: usize,
    pub app_types: usize,
    pub running_apps: usize,
    /// App types by descending count
    pub type_counts: Vec<(String, usize)>,
    /// Most used ports by descending count
    pub top_ports: Vec<(Port, usize)>,
    pub records: Vec<ApplicationRecord>,
}

/// Metrics for the records behind the active filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilteredSummary {
    pub applications: usize,
    pub instances: usize,
    pub app_types: usize,
}

/// Instances in first-encountered order
pub fn instance_summaries(dataset: &Dataset) -> Vec<InstanceSummary> {
    dataset
        .distinct(RecordField::InstanceName)
        .into_iter()
        .map(|name| {
            let records: Vec<_> = dataset.iter().filter(|r| r.instance_name == name).collect();
            InstanceSummary {
                instance_name: name.to_string(),
                instance_id: records.first().map(|r| r.instance_id.clone()).unwrap_or_default(),
                total_apps: records.len(),
                app_types: value_counts(records.iter().copied(), RecordField::AppType).len(),
            }
        })
        .collect()
}

/// Detail for one instance; `None` if the name is not in the dataset
pub fn instance_detail(dataset: &Dataset, instance_name: &str, settings: &ViewSettings) -> Option<InstanceDetail> {
    let records: Vec<&ApplicationRecord> = dataset.iter().filter(|r| r.instance_name == instance_name).collect();
    let first = records.first()?;

    let type_counts = value_counts(records.iter().copied(), RecordField::AppType);
    let usages = ports::port_usages(records.iter().copied());

    Some(InstanceDetail {
        instance_name: instance_name.to_string(),
        instance_id: first.instance_id.clone(),
        total_apps: records.len(),
        app_types: type_counts.len(),
        running_apps: running_count(records.iter().copied(), &settings.running_status),
        type_counts: ranked(&type_counts)
            .into_iter()
            .map(|(value, count)| (value.to_string(), count))
            .collect(),
        top_ports: ports::top_ports(&usages, settings.top_ports),
        records: records.into_iter().cloned().collect(),
    })
}

/// Records whose status is exactly `running_status`
pub fn running_count<'a, I>(records: I, running_status: &str) -> usize
where
    I: IntoIterator<Item = &'a ApplicationRecord>,
{
    records
        .into_iter()
        .filter(|record| record.app_status == running_status)
        .count()
}

pub fn filtered_summary(records: &[&ApplicationRecord]) -> FilteredSummary {
    FilteredSummary {
        applications: records.len(),
        instances: value_counts(records.iter().copied(), RecordField::InstanceName).len(),
        app_types: value_counts(records.iter().copied(), RecordField::AppType).len(),
    }
}
