pub mod import;
pub mod upload;

pub use import::{import_csv, import_json};
pub use upload::{aggregate, aggregate_with, ingest, ingest_batch, BatchOutcome, IngestReport, UploadBatch, UploadedFile};
