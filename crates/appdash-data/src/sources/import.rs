//! Reading exported datasets back in

use std::io::Read;

use appdash_core::records::{ApplicationRecord, Dataset};
use csv::ReaderBuilder;

use crate::DataError;

/// Parse a CSV export (header row of record field names)
pub fn import_csv<R: Read>(reader: R) -> Result<Dataset, DataError> {
    let mut csv_reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let records = csv_reader
        .deserialize::<ApplicationRecord>()
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!("Imported {} records from CSV", records.len());
    Ok(Dataset::new(records))
}

/// Parse a JSON export (array of record objects)
pub fn import_json(bytes: &[u8]) -> Result<Dataset, DataError> {
    let records: Vec<ApplicationRecord> = serde_json::from_slice(bytes)?;
    tracing::debug!("Imported {} records from JSON", records.len());
    Ok(Dataset::new(records))
}
