//! Ingestion of instance inventory documents
//!
//! Raw JSON buffers are validated ([`schema`]), flattened into
//! [`ApplicationRecord`]s ([`extract`]) and merged per upload batch
//! ([`sources`]). Exports written by the views crate can be read back
//! through [`sources::import_csv`] and [`sources::import_json`].

pub mod batch;
pub mod config;
pub mod extract;
pub mod schema;
pub mod sources;

use arrow::error::ArrowError;
use thiserror::Error;

// Re-exports
pub use appdash_core::records::{ApplicationRecord, Dataset, ProcessingError, RecordField, UNKNOWN};
pub use config::IngestConfig;
pub use extract::extract;
pub use schema::{validate, ApplicationEntry, InstanceDocument, SchemaValidator};
pub use sources::{aggregate, ingest, ingest_batch, BatchOutcome, IngestReport, UploadBatch, UploadedFile};

/// Reasons a single uploaded document is rejected
///
/// Every variant is recoverable: the file is reported and the batch moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File is empty")]
    EmptyInput,

    #[error("Invalid JSON format at line {line}: {message}")]
    MalformedJson { line: usize, message: String },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("'{field}' must be a {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("'{0}' list is empty")]
    EmptyList(&'static str),

    /// Index is zero-based; messages count from one
    #[error("Application {} must be an object", .0 + 1)]
    InvalidApplicationEntry(usize),

    #[error("Application {} missing '{field}' field", .index + 1)]
    MissingApplicationField { index: usize, field: &'static str },

    #[error("File is {size} bytes, above the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
}

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No valid data found in {files} uploaded file(s)")]
    BatchEmptyResult { files: usize },

    #[error("Other error: {0}")]
    Other(String),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => DataError::Io(std::io::Error::new(io_err.kind(), error.to_string())),
            _ => DataError::Csv(error.to_string()),
        }
    }
}
