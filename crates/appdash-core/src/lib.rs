//! Core functionality for the instance application dashboard
//!
//! This crate provides the record model shared by every other crate, the
//! page/filter navigation state machine and the session state that owns the
//! loaded dataset and the processing error log.

pub mod events;
pub mod navigation;
pub mod records;
pub mod state;

// Re-export commonly used types
pub use navigation::{
    Filter, FilterField, NavigationCommand, NavigationContext, NavigationEngine,
    NavigationWarning, View,
};
pub use events::{EventBus, SessionEvent};
pub use records::{ApplicationRecord, Dataset, ProcessingError, RecordField, UNKNOWN};
pub use state::AppState;
