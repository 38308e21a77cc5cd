//! Session events
//!
//! [`AppState`](crate::state::AppState) publishes one [`SessionEvent`] per
//! observable change. Listeners run synchronously, in subscription order,
//! on the thread that mutated the state.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::navigation::{Filter, View};

/// Something that changed in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A batch produced records and replaced the dataset
    DatasetReplaced { record_count: usize, failed_files: usize },
    /// A batch produced no records; the previous dataset was kept
    UploadRejected { failed_files: usize },
    /// The error log was dismissed
    ErrorsCleared { cleared: usize },
    /// The current view or filter changed
    NavigationChanged { view: View, filter: Option<Filter> },
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::DatasetReplaced {
                record_count,
                failed_files,
            } => write!(f, "loaded {} application(s), {} file error(s)", record_count, failed_files),
            SessionEvent::UploadRejected { failed_files } => {
                write!(f, "upload rejected, {} file error(s)", failed_files)
            }
            SessionEvent::ErrorsCleared { cleared } => write!(f, "cleared {} error(s)", cleared),
            SessionEvent::NavigationChanged { view, filter: Some(filter) } => {
                write!(f, "{} ({})", view.title(), filter)
            }
            SessionEvent::NavigationChanged { view, filter: None } => f.write_str(view.title()),
        }
    }
}

type Listener = Box<dyn FnMut(&SessionEvent) + Send>;

/// Fan-out of [`SessionEvent`]s to registered listeners
#[derive(Default)]
pub struct EventBus {
    listeners: Mutex<Vec<Listener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every subsequent event
    pub fn subscribe<F>(&self, listener: F)
    where
        F: FnMut(&SessionEvent) + Send + 'static,
    {
        self.listeners.lock().push(Box::new(listener));
    }

    pub fn publish(&self, event: SessionEvent) {
        tracing::trace!("Session event: {:?}", event);
        for listener in self.listeners.lock().iter_mut() {
            listener(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}
