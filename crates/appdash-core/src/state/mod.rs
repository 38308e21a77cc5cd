//! Session state: the loaded dataset, the error log and navigation

use crate::events::{EventBus, SessionEvent};
use crate::navigation::{resolve, NavigationCommand, NavigationContext, NavigationEngine, NavigationWarning};
use crate::records::{ApplicationRecord, Dataset, ProcessingError};

/// Everything one dashboard session mutates
///
/// Handlers receive the state by reference; there is no ambient global.
/// The dataset only changes through [`AppState::upload_succeeded`]. A
/// successful upload restarts the error log with its own file errors, a
/// rejected one appends to it, and [`AppState::clear_errors`] empties it.
#[derive(Default)]
pub struct AppState {
    dataset: Dataset,
    errors: Vec<ProcessingError>,
    navigation: NavigationEngine,
    event_bus: EventBus,
}

impl AppState {
    /// Create a new session with no data, no errors and the overview page
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn has_data(&self) -> bool {
        !self.dataset.is_empty()
    }

    pub fn errors(&self) -> &[ProcessingError] {
        &self.errors
    }

    pub fn navigation(&self) -> &NavigationEngine {
        &self.navigation
    }

    pub fn navigation_mut(&mut self) -> &mut NavigationEngine {
        &mut self.navigation
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn context(&self) -> NavigationContext {
        self.navigation.get_context()
    }

    /// A batch produced records: replace the dataset wholesale
    ///
    /// The error log is reset to the batch's own per-file errors. View and
    /// filter are kept; a filter whose value vanished resolves to zero rows.
    pub fn upload_succeeded(&mut self, dataset: Dataset, file_errors: Vec<ProcessingError>) {
        tracing::info!(
            "Dataset replaced: {} records ({} previous), {} file error(s)",
            dataset.len(),
            self.dataset.len(),
            file_errors.len()
        );
        let record_count = dataset.len();
        let failed_files = file_errors.len();

        self.dataset = dataset;
        self.errors = file_errors;

        self.event_bus.publish(SessionEvent::DatasetReplaced {
            record_count,
            failed_files,
        });
    }

    /// A batch produced no records: keep the dataset and navigation
    ///
    /// The batch's per-file errors are appended to the log.
    pub fn upload_failed(&mut self, file_errors: Vec<ProcessingError>) {
        tracing::error!(
            "Upload rejected: no valid data in batch ({} file error(s)), keeping {} records",
            file_errors.len(),
            self.dataset.len()
        );
        let failed_files = file_errors.len();
        self.errors.extend(file_errors);

        self.event_bus.publish(SessionEvent::UploadRejected { failed_files });
    }

    /// Dismiss every logged error
    pub fn clear_errors(&mut self) -> usize {
        let cleared = self.errors.len();
        self.errors.clear();
        if cleared > 0 {
            self.event_bus.publish(SessionEvent::ErrorsCleared { cleared });
        }
        cleared
    }

    /// Route a UI command to the navigation state machine
    pub fn dispatch(&mut self, command: NavigationCommand) -> Option<NavigationWarning> {
        let before = self.navigation.get_context();
        let warning = self.navigation.handle(command, &self.dataset);
        let after = self.navigation.get_context();

        if before != after {
            self.event_bus.publish(SessionEvent::NavigationChanged {
                view: after.current_view,
                filter: after.active_filter,
            });
        }

        warning
    }

    /// The dataset narrowed by the active filter
    pub fn filtered_records(&self) -> Vec<&ApplicationRecord> {
        resolve(&self.dataset, self.navigation.active_filter())
    }
}
