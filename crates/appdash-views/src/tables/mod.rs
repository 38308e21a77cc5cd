//! Record tables: search, column presets and text rendering

use appdash_core::records::{ApplicationRecord, Dataset, RecordField};
use appdash_data::batch::to_record_batch;
use appdash_data::DataError;
use arrow::util::pretty::pretty_format_batches;
use serde::{Deserialize, Serialize};

/// Columns of the filtered view table
pub const FILTERED_COLUMNS: [RecordField; 6] = [
    RecordField::InstanceName,
    RecordField::AppName,
    RecordField::AppType,
    RecordField::AppStatus,
    RecordField::Ports,
    RecordField::AppImage,
];

/// Columns of the per-instance application table
pub const INSTANCE_COLUMNS: [RecordField; 5] = [
    RecordField::AppName,
    RecordField::AppType,
    RecordField::AppStatus,
    RecordField::Ports,
    RecordField::AppImage,
];

/// Search and selects of the database table page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableQuery {
    /// Case-insensitive substring of app name, app type or instance name
    pub search: Option<String>,
    /// Exact app type
    pub app_type: Option<String>,
    /// Exact instance name
    pub instance: Option<String>,
}

impl TableQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_app_type(mut self, app_type: impl Into<String>) -> Self {
        self.app_type = Some(app_type.into());
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.search.as_deref().map_or(true, |s| s.trim().is_empty()) && self.app_type.is_none() && self.instance.is_none()
    }

    pub fn matches(&self, record: &ApplicationRecord) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let needle = term.to_lowercase();
            let hit = [&record.app_name, &record.app_type, &record.instance_name]
                .iter()
                .any(|value| value.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        self.app_type.as_ref().map_or(true, |t| &record.app_type == t)
            && self.instance.as_ref().map_or(true, |i| &record.instance_name == i)
    }

    /// Matching records in dataset order
    pub fn apply<'a>(&self, dataset: &'a Dataset) -> Vec<&'a ApplicationRecord> {
        dataset.iter().filter(|record| self.matches(record)).collect()
    }
}

/// Render records as a boxed text table
///
/// At most `max_rows` rows are drawn; a trailing line reports how many were
/// left out.
pub fn render_table(records: &[&ApplicationRecord], columns: &[RecordField], max_rows: usize) -> Result<String, DataError> {
    let shown = &records[..records.len().min(max_rows)];
    let batch = to_record_batch(shown, columns)?;
    let mut text = pretty_format_batches(&[batch])?.to_string();
    if shown.len() < records.len() {
        text.push_str(&format!("\n... {} more rows", records.len() - shown.len()));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::tests_support::record;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            record("web-01", "nginx", "docker", "running"),
            record("db-01", "postgres", "service", "running"),
            record("web-02", "Nginx-Exporter", "service", "stopped"),
        ])
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let data = dataset();
        assert!(TableQuery::new().is_empty());
        assert_eq!(TableQuery::new().apply(&data).len(), 3);
        assert!(TableQuery::new().with_search("  ").is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive_across_columns() {
        let data = dataset();
        let hits = TableQuery::new().with_search("NGINX").apply(&data);
        assert_eq!(hits.len(), 2);

        let by_instance = TableQuery::new().with_search("db-").apply(&data);
        assert_eq!(by_instance.len(), 1);
        assert_eq!(by_instance[0].app_name, "postgres");

        let by_type = TableQuery::new().with_search("servi").apply(&data);
        assert_eq!(by_type.len(), 2);
    }

    #[test]
    fn test_selects_combine_with_search() {
        let data = dataset();
        let hits = TableQuery::new()
            .with_search("nginx")
            .with_app_type("service")
            .apply(&data);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].instance_name, "web-02");

        let none = TableQuery::new().with_instance("web-01").with_app_type("service").apply(&data);
        assert!(none.is_empty());
    }

    #[test]
    fn test_render_table() {
        let data = dataset();
        let rows: Vec<_> = data.iter().collect();
        let text = render_table(&rows, &FILTERED_COLUMNS, 10).unwrap();
        assert!(text.contains("instance_name"));
        assert!(text.contains("postgres"));
        assert!(!text.contains("more rows"));

        let truncated = render_table(&rows, &INSTANCE_COLUMNS, 1).unwrap();
        assert!(truncated.contains("nginx"));
        assert!(!truncated.contains("postgres"));
        assert!(truncated.ends_with("... 2 more rows"));
    }
}
