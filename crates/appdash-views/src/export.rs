//! CSV and JSON export of record sets

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use appdash_core::navigation::Filter;
use appdash_core::records::{ApplicationRecord, RecordField};
use appdash_data::DataError;

use crate::ViewSettings;

/// Export format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unsupported export format '{}'", other)),
        }
    }
}

/// Write records as CSV with a header row of the eleven column names
pub fn write_csv<W: Write>(records: &[&ApplicationRecord], writer: W) -> Result<(), DataError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    if records.is_empty() {
        csv_writer.write_record(RecordField::ALL.iter().map(|f| f.name()))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Records as a JSON array of objects keyed by column name
pub fn to_json(records: &[&ApplicationRecord], pretty: bool) -> Result<Vec<u8>, DataError> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(records)?
    } else {
        serde_json::to_vec(records)?
    };
    Ok(bytes)
}

/// Serialize records in `format`
pub fn export(records: &[&ApplicationRecord], format: ExportFormat, settings: &ViewSettings) -> Result<Vec<u8>, DataError> {
    match format {
        ExportFormat::Csv => {
            let mut buffer = Vec::new();
            write_csv(records, &mut buffer)?;
            Ok(buffer)
        }
        ExportFormat::Json => to_json(records, settings.pretty_json),
    }
}

/// Serialize records to a file, returning the number of bytes written
pub fn export_to_path(
    records: &[&ApplicationRecord],
    format: ExportFormat,
    settings: &ViewSettings,
    path: &Path,
) -> Result<usize, DataError> {
    let bytes = export(records, format, settings)?;
    std::fs::write(path, &bytes)?;
    tracing::info!("Exported {} records to {}", records.len(), path.display());
    Ok(bytes.len())
}

/// `filtered_applications_<value>.<ext>`, or `..._all` without a filter
pub fn filtered_file_name(filter: Option<&Filter>, format: ExportFormat) -> String {
    let suffix = filter
        .map(|f| f.value.replace(['/', '\\'], "_"))
        .unwrap_or_else(|| "all".to_string());
    format!("filtered_applications_{}.{}", suffix, format.extension())
}

/// `application_database.<ext>`
pub fn database_file_name(format: ExportFormat) -> String {
    format!("application_database.{}", format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::tests_support::{record, with_ports};
    use appdash_data::sources::import::{import_csv, import_json};

    fn records() -> Vec<ApplicationRecord> {
        vec![
            with_ports(record("web", "nginx", "docker", "running"), "80, 443"),
            record("db", "postgres", "service", "stopped"),
        ]
    }

    #[test]
    fn test_csv_has_header_and_quotes_lists() {
        let data = records();
        let refs: Vec<_> = data.iter().collect();
        let bytes = export(&refs, ExportFormat::Csv, &ViewSettings::default()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("instance_id,instance_name,script_version,app_name,app_type,app_status,app_image,ports,pids,process_name,container_id")
        );
        assert!(text.contains("\"80, 443\""));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_csv_export_reimports() {
        let data = records();
        let refs: Vec<_> = data.iter().collect();
        let bytes = export(&refs, ExportFormat::Csv, &ViewSettings::default()).unwrap();
        let imported = import_csv(bytes.as_slice()).unwrap();
        assert_eq!(imported.records(), data.as_slice());
    }

    #[test]
    fn test_json_export_is_indented_array() {
        let data = records();
        let refs: Vec<_> = data.iter().collect();
        let bytes = export(&refs, ExportFormat::Json, &ViewSettings::default()).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("[\n  {\n    \"instance_id\""));
        assert_eq!(import_json(&bytes).unwrap().records(), data.as_slice());

        let compact = to_json(&refs, false).unwrap();
        assert!(!compact.contains(&b'\n'));
    }

    #[test]
    fn test_empty_exports() {
        let csv = export(&[], ExportFormat::Csv, &ViewSettings::default()).unwrap();
        assert!(String::from_utf8(csv).unwrap().starts_with("instance_id,"));
        let json = export(&[], ExportFormat::Json, &ViewSettings::default()).unwrap();
        assert_eq!(json, b"[]");
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            filtered_file_name(Some(&Filter::app_type("docker")), ExportFormat::Csv),
            "filtered_applications_docker.csv"
        );
        assert_eq!(filtered_file_name(None, ExportFormat::Json), "filtered_applications_all.json");
        assert_eq!(
            filtered_file_name(Some(&Filter::instance("a/b")), ExportFormat::Json),
            "filtered_applications_a_b.json"
        );
        assert_eq!(database_file_name(ExportFormat::Csv), "application_database.csv");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!("json".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert!("xml".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Json.mime_type(), "application/json");
    }

    #[test]
    fn test_export_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(database_file_name(ExportFormat::Json));
        let data = records();
        let refs: Vec<_> = data.iter().collect();
        let written = export_to_path(&refs, ExportFormat::Json, &ViewSettings::default(), &path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len() as usize, written);
    }
}
