//! Filter predicate evaluation

use super::{Filter, FilterField};
use crate::records::{ApplicationRecord, Dataset};

impl Filter {
    /// Exact, case-sensitive comparison against the filtered column
    pub fn matches(&self, record: &ApplicationRecord) -> bool {
        record.field(self.field.record_field()) == self.value
    }

    /// Whether the dataset has the column this filter needs
    pub fn is_available(&self, dataset: &Dataset) -> bool {
        match self.field {
            FilterField::AppStatus => dataset.has_status(),
            FilterField::AppType | FilterField::Instance => true,
        }
    }
}

/// Records passing the filter, in dataset order
///
/// With no filter every record is returned. A value that no record holds
/// yields an empty result rather than an error.
pub fn resolve<'a>(dataset: &'a Dataset, filter: Option<&Filter>) -> Vec<&'a ApplicationRecord> {
    match filter {
        Some(filter) => dataset.iter().filter(|record| filter.matches(record)).collect(),
        None => dataset.iter().collect(),
    }
}
