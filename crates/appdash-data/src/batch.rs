//! Columnar view of records for tabular display

use std::sync::Arc;

use appdash_core::records::{ApplicationRecord, RecordField};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::DataError;

/// Arrow schema of the flattened table: every column is non-null Utf8
pub fn record_schema(columns: &[RecordField]) -> Schema {
    let fields = columns
        .iter()
        .map(|field| Field::new(field.name(), DataType::Utf8, false))
        .collect::<Vec<_>>();
    Schema::new(fields)
}

/// Build a record batch holding the chosen columns of `records`
pub fn to_record_batch(records: &[&ApplicationRecord], columns: &[RecordField]) -> Result<RecordBatch, DataError> {
    let schema = Arc::new(record_schema(columns));

    let arrays = columns
        .iter()
        .map(|field| {
            let values = records.iter().map(|record| record.field(*field));
            Arc::new(StringArray::from_iter_values(values)) as ArrayRef
        })
        .collect::<Vec<_>>();

    RecordBatch::try_new(schema, arrays).map_err(DataError::from)
}
