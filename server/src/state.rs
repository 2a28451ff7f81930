//! Application state shared across HTTP handlers.

use clubdesk_core::{Notifier, RegistrationManager, RegistrationStore};
use std::sync::Arc;

/// Shared resources for the API endpoints; cloned cheaply per request.
#[derive(Clone)]
pub struct AppState {
    /// Orchestrates registrations, payments and refunds.
    pub manager: RegistrationManager,
    /// Direct store handle for readiness probes.
    pub store: Arc<dyn RegistrationStore>,
}

impl AppState {
    /// Builds state over a store and notifier pair.
    #[must_use]
    pub fn new(store: Arc<dyn RegistrationStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            manager: RegistrationManager::new(Arc::clone(&store), notifier),
            store,
        }
    }
}
