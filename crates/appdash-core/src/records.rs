//! Flattened application records and the dataset they form

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used when an instance or application attribute is absent
pub const UNKNOWN: &str = "Unknown";

/// One application of one instance, flattened into string columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub instance_id: String,
    pub instance_name: String,
    pub script_version: String,
    pub app_name: String,
    pub app_type: String,
    pub app_status: String,
    pub app_image: String,
    /// Comma-and-space joined port numbers, e.g. `"80, 443"`
    pub ports: String,
    /// Comma-and-space joined process ids
    pub pids: String,
    pub process_name: String,
    pub container_id: String,
}

/// Column of an [`ApplicationRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    InstanceId,
    InstanceName,
    ScriptVersion,
    AppName,
    AppType,
    AppStatus,
    AppImage,
    Ports,
    Pids,
    ProcessName,
    ContainerId,
}

impl RecordField {
    /// All columns in export order
    pub const ALL: [RecordField; 11] = [
        RecordField::InstanceId,
        RecordField::InstanceName,
        RecordField::ScriptVersion,
        RecordField::AppName,
        RecordField::AppType,
        RecordField::AppStatus,
        RecordField::AppImage,
        RecordField::Ports,
        RecordField::Pids,
        RecordField::ProcessName,
        RecordField::ContainerId,
    ];

    /// Column name as used in exports
    pub fn name(&self) -> &'static str {
        match self {
            RecordField::InstanceId => "instance_id",
            RecordField::InstanceName => "instance_name",
            RecordField::ScriptVersion => "script_version",
            RecordField::AppName => "app_name",
            RecordField::AppType => "app_type",
            RecordField::AppStatus => "app_status",
            RecordField::AppImage => "app_image",
            RecordField::Ports => "ports",
            RecordField::Pids => "pids",
            RecordField::ProcessName => "process_name",
            RecordField::ContainerId => "container_id",
        }
    }

    /// Look a column up by its export name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.name() == name)
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ApplicationRecord {
    /// Value of a single column
    pub fn field(&self, field: RecordField) -> &str {
        match field {
            RecordField::InstanceId => &self.instance_id,
            RecordField::InstanceName => &self.instance_name,
            RecordField::ScriptVersion => &self.script_version,
            RecordField::AppName => &self.app_name,
            RecordField::AppType => &self.app_type,
            RecordField::AppStatus => &self.app_status,
            RecordField::AppImage => &self.app_image,
            RecordField::Ports => &self.ports,
            RecordField::Pids => &self.pids,
            RecordField::ProcessName => &self.process_name,
            RecordField::ContainerId => &self.container_id,
        }
    }

    /// All column values in [`RecordField::ALL`] order
    pub fn values(&self) -> [&str; 11] {
        RecordField::ALL.map(|field| self.field(field))
    }
}

/// The flattened collection of every record currently loaded
///
/// Records keep upload order: file order first, then application order
/// within each file. Tie-breaks in the summaries rely on that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<ApplicationRecord>,
}

impl Dataset {
    pub fn new(records: Vec<ApplicationRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ApplicationRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ApplicationRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ApplicationRecord> {
        self.records.iter()
    }

    /// Whether any record carries a reported status
    ///
    /// Records whose source omitted the status hold [`UNKNOWN`], so a dataset
    /// made only of those has no usable status column.
    pub fn has_status(&self) -> bool {
        self.records
            .iter()
            .any(|record| !record.app_status.is_empty() && record.app_status != UNKNOWN)
    }

    /// Distinct values of a column in first-encountered order
    pub fn distinct(&self, field: RecordField) -> Vec<&str> {
        let mut seen = AHashSet::new();
        self.records
            .iter()
            .map(|record| record.field(field))
            .filter(|value| seen.insert(*value))
            .collect()
    }
}

impl FromIterator<ApplicationRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = ApplicationRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a ApplicationRecord;
    type IntoIter = std::slice::Iter<'a, ApplicationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// A file that could not be turned into records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingError {
    pub source_file_name: String,
    pub message: String,
}

impl ProcessingError {
    pub fn new(source_file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source_file_name: source_file_name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ProcessingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error processing {}: {}", self.source_file_name, self.message)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a record with only the columns the tests care about
    pub(crate) fn record(instance: &str, app: &str, app_type: &str, status: &str) -> ApplicationRecord {
        ApplicationRecord {
            instance_id: format!("id-{}", instance),
            instance_name: instance.to_string(),
            script_version: UNKNOWN.to_string(),
            app_name: app.to_string(),
            app_type: app_type.to_string(),
            app_status: status.to_string(),
            app_image: String::new(),
            ports: String::new(),
            pids: String::new(),
            process_name: String::new(),
            container_id: String::new(),
        }
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in RecordField::ALL {
            assert_eq!(RecordField::from_name(field.name()), Some(field));
        }
        assert_eq!(RecordField::from_name("nope"), None);
    }

    #[test]
    fn test_values_follow_column_order() {
        let rec = record("host-a", "nginx", "docker", "running");
        let values = rec.values();
        assert_eq!(values[0], "id-host-a");
        assert_eq!(values[1], "host-a");
        assert_eq!(values[3], "nginx");
        assert_eq!(values[5], "running");
    }

    #[test]
    fn test_has_status() {
        let unknown = Dataset::new(vec![record("a", "x", "docker", UNKNOWN)]);
        assert!(!unknown.has_status());
        assert!(!Dataset::default().has_status());

        let known = Dataset::new(vec![
            record("a", "x", "docker", UNKNOWN),
            record("a", "y", "docker", "stopped"),
        ]);
        assert!(known.has_status());
    }

    #[test]
    fn test_distinct_keeps_first_seen_order() {
        let dataset = Dataset::new(vec![
            record("b", "x", "vm", "running"),
            record("a", "y", "docker", "running"),
            record("b", "z", "vm", "running"),
        ]);
        assert_eq!(dataset.distinct(RecordField::InstanceName), vec!["b", "a"]);
        assert_eq!(dataset.distinct(RecordField::AppType), vec!["vm", "docker"]);
    }

    #[test]
    fn test_distinct_collapses_repeats() {
        let dataset: Dataset = (0..50)
            .map(|i| record(&format!("host-{}", i % 3), "x", "docker", "running"))
            .collect();
        assert_eq!(
            dataset.distinct(RecordField::InstanceName),
            vec!["host-0", "host-1", "host-2"]
        );
        assert!(Dataset::default().distinct(RecordField::AppType).is_empty());
    }

    #[test]
    fn test_processing_error_display() {
        let err = ProcessingError::new("bad.json", "File is empty");
        assert_eq!(err.to_string(), "Error processing bad.json: File is empty");
    }
}
