//! Upload batches: per-file validation, extraction and aggregation

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use appdash_core::records::{ApplicationRecord, Dataset, ProcessingError};
use appdash_core::state::AppState;
use chrono::{DateTime, Utc};

use crate::config::IngestConfig;
use crate::extract::extract;
use crate::schema::SchemaValidator;
use crate::{DataError, ValidationError};

/// A file as handed over by the upload surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk; its name is the last path component
    pub fn from_path(path: &Path) -> Result<Self, DataError> {
        let bytes = std::fs::read(path)?;
        Ok(Self {
            name: display_name(path),
            bytes,
        })
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, DataError> {
    let mut entries = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();
    Ok(entries)
}

/// Files read from disk for one upload
///
/// Reading never aborts: a path that cannot be read is kept as a
/// [`ProcessingError`] next to the files that could.
#[derive(Debug, Clone, Default)]
pub struct UploadBatch {
    pub files: Vec<UploadedFile>,
    /// One entry per unreadable path, in discovery order
    pub unreadable: Vec<ProcessingError>,
}

impl UploadBatch {
    /// Read every path, expanding directories to their accepted files
    ///
    /// Directory entries are sorted by name so a batch read twice yields the
    /// same record order.
    pub fn collect(paths: &[PathBuf], config: &IngestConfig) -> Self {
        let mut batch = Self::default();
        for path in paths {
            if !path.is_dir() {
                batch.read(path);
                continue;
            }
            match sorted_entries(path) {
                Ok(entries) => {
                    for entry in entries.iter().filter(|e| !e.is_dir() && config.accepts(e)) {
                        batch.read(entry);
                    }
                }
                Err(err) => batch.reject(path, &err),
            }
        }
        batch
    }

    /// Number of paths in the batch, readable or not
    pub fn len(&self) -> usize {
        self.files.len() + self.unreadable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&mut self, path: &Path) {
        match UploadedFile::from_path(path) {
            Ok(file) => self.files.push(file),
            Err(err) => self.reject(path, &err),
        }
    }

    fn reject(&mut self, path: &Path, err: &DataError) {
        tracing::warn!("Could not read {}: {}", path.display(), err);
        self.unreadable
            .push(ProcessingError::new(display_name(path), format!("Could not read file: {}", err)));
    }
}

impl From<Vec<UploadedFile>> for UploadBatch {
    fn from(files: Vec<UploadedFile>) -> Self {
        Self {
            files,
            unreadable: Vec::new(),
        }
    }
}

/// Result of running one batch through validation and extraction
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Records of every accepted file, in upload order
    pub records: Vec<ApplicationRecord>,
    /// One entry per rejected file, in upload order
    pub errors: Vec<ProcessingError>,
    pub file_count: usize,
    pub elapsed: Duration,
}

impl BatchOutcome {
    /// Files that contributed records
    pub fn accepted_files(&self) -> usize {
        self.file_count - self.errors.len()
    }

    /// Whether the batch may replace the dataset
    pub fn is_usable(&self) -> bool {
        !self.records.is_empty()
    }
}

/// Summary of a batch that replaced the dataset
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub file_count: usize,
    pub accepted_files: usize,
    pub record_count: usize,
    pub failed_files: usize,
    pub elapsed: Duration,
    pub completed_at: DateTime<Utc>,
}

/// Run a batch with default validation settings
pub fn aggregate(files: &[UploadedFile]) -> BatchOutcome {
    aggregate_with(files, &SchemaValidator::new())
}

/// Validate and extract every file independently
///
/// A failing file adds one [`ProcessingError`] and never stops the batch.
pub fn aggregate_with(files: &[UploadedFile], validator: &SchemaValidator) -> BatchOutcome {
    let start = Instant::now();
    let mut records = Vec::new();
    let mut errors = Vec::new();

    for file in files {
        match process_file(file, validator) {
            Ok(extracted) => {
                tracing::debug!("Extracted {} records from {}", extracted.len(), file.name);
                records.extend(extracted);
            }
            Err(err) => {
                tracing::warn!("Rejected {}: {}", file.name, err);
                errors.push(ProcessingError::new(file.name.clone(), err.to_string()));
            }
        }
    }

    let outcome = BatchOutcome {
        records,
        errors,
        file_count: files.len(),
        elapsed: start.elapsed(),
    };
    tracing::info!(
        "Processed {} files in {:.2}s: {} records, {} rejected",
        outcome.file_count,
        outcome.elapsed.as_secs_f64(),
        outcome.records.len(),
        outcome.errors.len()
    );
    outcome
}

fn process_file(file: &UploadedFile, validator: &SchemaValidator) -> Result<Vec<ApplicationRecord>, ValidationError> {
    let document = validator.validate(&file.bytes)?;
    let records = extract(&document);
    if records.is_empty() {
        return Err(ValidationError::EmptyList("applications"));
    }
    Ok(records)
}

/// Run a batch and apply it to the session
///
/// A batch with records replaces the dataset. A batch without any keeps the
/// previous dataset, logs the per-file errors and fails with
/// [`DataError::BatchEmptyResult`].
pub fn ingest(state: &mut AppState, files: &[UploadedFile], config: &IngestConfig) -> Result<IngestReport, DataError> {
    apply(state, aggregate_with(files, &SchemaValidator::from_config(config)))
}

/// Like [`ingest`], for a batch read from disk
///
/// Unreadable paths count as rejected files and are logged ahead of the
/// validation errors.
pub fn ingest_batch(state: &mut AppState, batch: UploadBatch, config: &IngestConfig) -> Result<IngestReport, DataError> {
    let mut outcome = aggregate_with(&batch.files, &SchemaValidator::from_config(config));
    let mut errors = batch.unreadable;
    outcome.file_count += errors.len();
    errors.append(&mut outcome.errors);
    outcome.errors = errors;
    apply(state, outcome)
}

fn apply(state: &mut AppState, outcome: BatchOutcome) -> Result<IngestReport, DataError> {
    if !outcome.is_usable() {
        state.upload_failed(outcome.errors);
        return Err(DataError::BatchEmptyResult {
            files: outcome.file_count,
        });
    }

    let report = IngestReport {
        file_count: outcome.file_count,
        accepted_files: outcome.accepted_files(),
        record_count: outcome.records.len(),
        failed_files: outcome.errors.len(),
        elapsed: outcome.elapsed,
        completed_at: Utc::now(),
    };
    state.upload_succeeded(Dataset::new(outcome.records), outcome.errors);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use appdash_core::navigation::{NavigationCommand, View};

    const HOST_A: &str = r#"{
        "instance_id": "i-1",
        "instance_name": "host-a",
        "applications": [
            {"name": "nginx", "type": "docker", "status": "running", "ports": [80, 443]},
            {"name": "redis", "type": "docker", "status": "stopped", "ports": []}
        ]
    }"#;

    const HOST_B: &str = r#"{
        "instance_id": "i-2",
        "instance_name": "host-b",
        "script_version": "1.2",
        "applications": [{"name": "postgres", "type": "vm", "status": "running"}]
    }"#;

    #[test]
    fn test_single_valid_file() {
        let outcome = aggregate(&[UploadedFile::new("a.json", HOST_A)]);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].ports, "80, 443");
        assert_eq!(outcome.records[1].ports, "");
        assert_eq!(outcome.accepted_files(), 1);
    }

    #[test]
    fn test_bad_file_does_not_abort_batch() {
        let outcome = aggregate(&[
            UploadedFile::new("empty.json", Vec::new()),
            UploadedFile::new("b.json", HOST_B),
        ]);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].source_file_name, "empty.json");
        assert_eq!(outcome.errors[0].message, ValidationError::EmptyInput.to_string());
    }

    #[test]
    fn test_records_follow_upload_order() {
        let outcome = aggregate(&[
            UploadedFile::new("b.json", HOST_B),
            UploadedFile::new("a.json", HOST_A),
        ]);
        let names: Vec<_> = outcome.records.iter().map(|r| r.app_name.as_str()).collect();
        assert_eq!(names, vec!["postgres", "nginx", "redis"]);
    }

    #[test]
    fn test_ingest_replaces_dataset_and_reports_file_errors() {
        let mut state = AppState::new();
        let report = ingest(
            &mut state,
            &[
                UploadedFile::new("empty.json", Vec::new()),
                UploadedFile::new("b.json", HOST_B),
            ],
            &IngestConfig::default(),
        )
        .unwrap();

        assert_eq!(report.record_count, 1);
        assert_eq!(report.failed_files, 1);
        assert_eq!(state.dataset().len(), 1);
        assert_eq!(state.errors().len(), 1);
        assert_eq!(state.errors()[0].source_file_name, "empty.json");
        assert_eq!(state.errors()[0].message, "File is empty");
    }

    #[test]
    fn test_ingest_all_invalid_keeps_previous_dataset() {
        let mut state = AppState::new();
        ingest(&mut state, &[UploadedFile::new("a.json", HOST_A)], &IngestConfig::default()).unwrap();
        state.dispatch(NavigationCommand::navigate(View::InstanceDetails));
        let before = state.dataset().clone();

        let err = ingest(
            &mut state,
            &[
                UploadedFile::new("one.json", Vec::new()),
                UploadedFile::new("two.json", "{not json"),
                UploadedFile::new("three.json", r#"{"instance_id": "x"}"#),
            ],
            &IngestConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(err, DataError::BatchEmptyResult { files: 3 }));
        assert_eq!(state.dataset(), &before);
        assert_eq!(state.errors().len(), 3);
        assert_eq!(state.context().current_view, View::InstanceDetails);
    }

    #[test]
    fn test_ingest_all_invalid_on_fresh_session() {
        let mut state = AppState::new();
        let result = ingest(&mut state, &[UploadedFile::new("one.json", "[]")], &IngestConfig::default());
        assert!(result.is_err());
        assert!(!state.has_data());
        assert_eq!(state.errors().len(), 1);
    }

    #[test]
    fn test_size_limit_is_per_file() {
        let config = IngestConfig {
            max_file_bytes: HOST_B.len(),
            ..IngestConfig::default()
        };
        let mut state = AppState::new();
        let report = ingest(
            &mut state,
            &[UploadedFile::new("a.json", HOST_A), UploadedFile::new("b.json", HOST_B)],
            &config,
        )
        .unwrap();
        assert_eq!(report.record_count, 1);
        assert!(state.errors()[0].message.contains("byte limit"));
    }

    #[test]
    fn test_collect_expands_directories_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.json"), HOST_B).unwrap();
        std::fs::write(dir.path().join("a.json"), HOST_A).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
        std::fs::create_dir(dir.path().join("nested.json")).unwrap();

        let batch = UploadBatch::collect(&[dir.path().to_path_buf()], &IngestConfig::default());
        let names: Vec<_> = batch.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
        assert!(batch.unreadable.is_empty());
    }

    #[test]
    fn test_collect_records_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), HOST_A).unwrap();
        let paths = vec![dir.path().join("absent.json"), dir.path().join("a.json")];

        let batch = UploadBatch::collect(&paths, &IngestConfig::default());
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.files[0].name, "a.json");
        assert_eq!(batch.unreadable[0].source_file_name, "absent.json");
        assert!(batch.unreadable[0].message.starts_with("Could not read file"));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_in_directory_is_logged_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), HOST_A).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.json"), dir.path().join("broken.json")).unwrap();

        let batch = UploadBatch::collect(&[dir.path().to_path_buf()], &IngestConfig::default());
        assert_eq!(batch.files.len(), 1);
        assert_eq!(batch.unreadable.len(), 1);
        assert_eq!(batch.unreadable[0].source_file_name, "broken.json");

        let mut state = AppState::new();
        let report = ingest_batch(&mut state, batch, &IngestConfig::default()).unwrap();
        assert_eq!(report.file_count, 2);
        assert_eq!(report.accepted_files, 1);
        assert_eq!(report.failed_files, 1);
        assert_eq!(state.dataset().len(), 2);
        assert_eq!(state.errors()[0].source_file_name, "broken.json");
    }

    #[test]
    fn test_ingest_batch_of_only_unreadable_paths() {
        let mut state = AppState::new();
        let batch = UploadBatch::collect(&[PathBuf::from("/nonexistent/appdash/x.json")], &IngestConfig::default());

        let err = ingest_batch(&mut state, batch, &IngestConfig::default()).unwrap_err();
        assert!(matches!(err, DataError::BatchEmptyResult { files: 1 }));
        assert_eq!(state.errors().len(), 1);
        assert_eq!(state.errors()[0].source_file_name, "x.json");
    }
}
