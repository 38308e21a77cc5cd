//! Navigation engine implementation

use super::{Filter, NavigationCommand, NavigationContext, NavigationWarning, View};
use crate::records::Dataset;

/// Navigation state stored internally
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct NavigationState {
    current_view: View,
    active_filter: Option<Filter>,
}

/// The page/filter state machine
///
/// Starts on the overview with no filter. Every transition is applied
/// synchronously by [`NavigationEngine::handle`].
#[derive(Debug, Default)]
pub struct NavigationEngine {
    state: NavigationState,
}

impl NavigationEngine {
    /// Create a new navigation engine on the overview page
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_view(&self) -> View {
        self.state.current_view
    }

    pub fn active_filter(&self) -> Option<&Filter> {
        self.state.active_filter.as_ref()
    }

    /// Apply one command
    ///
    /// The dataset is consulted only to decide whether a status filter can be
    /// honoured. When it cannot, the engine switches to the filtered view
    /// without a filter and returns a warning instead of failing.
    pub fn handle(&mut self, command: NavigationCommand, dataset: &Dataset) -> Option<NavigationWarning> {
        let before = self.state.clone();
        let mut warning = None;

        match command {
            NavigationCommand::NavigateTo { view, filter } => {
                self.state.current_view = view;
                if let Some(filter) = filter {
                    self.state.active_filter = Some(filter);
                }
            }
            NavigationCommand::SelectAppType(value) => {
                self.select(Filter::app_type(value));
            }
            NavigationCommand::SelectInstance(value) => {
                self.select(Filter::instance(value));
            }
            NavigationCommand::SelectAppStatus(value) => {
                let filter = Filter::app_status(value);
                if filter.is_available(dataset) {
                    self.select(filter);
                } else {
                    tracing::warn!("Status filter '{}' unavailable, showing unfiltered dataset", filter.value);
                    self.state.current_view = View::FilteredView;
                    self.state.active_filter = None;
                    warning = Some(NavigationWarning::FilterUnavailable {
                        field: filter.field,
                        value: filter.value,
                    });
                }
            }
            NavigationCommand::ClearFilter => {
                self.state.active_filter = None;
            }
        }

        if self.state != before {
            tracing::debug!(
                "Navigation: {} -> {} (filter: {:?})",
                before.current_view.key(),
                self.state.current_view.key(),
                self.state.active_filter
            );
        }

        warning
    }

    fn select(&mut self, filter: Filter) {
        self.state.current_view = View::FilteredView;
        self.state.active_filter = Some(filter);
    }

    /// Get current navigation context
    pub fn get_context(&self) -> NavigationContext {
        NavigationContext {
            current_view: self.state.current_view,
            active_filter: self.state.active_filter.clone(),
        }
    }
}
