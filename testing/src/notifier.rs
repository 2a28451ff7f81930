//! Notifier that records signals for assertions.

#![allow(clippy::unwrap_used)] // Test infrastructure unwraps its own mutex

use async_trait::async_trait;
use clubdesk_core::notify::Notifier;
use clubdesk_core::types::{Registration, RegistrationId};
use std::sync::{Arc, Mutex};

/// A lifecycle signal observed by [`CollectingNotifier`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signal {
    /// Registration admitted with a confirmed slot.
    Confirmed(RegistrationId),
    /// Registration admitted onto the waitlist at a position.
    Waitlisted(RegistrationId, Option<u32>),
    /// Waitlisted registration promoted to confirmed.
    Promoted(RegistrationId),
    /// Registration cancelled.
    Cancelled(RegistrationId),
}

/// Records every signal it receives, in order.
#[derive(Clone, Default)]
pub struct CollectingNotifier {
    signals: Arc<Mutex<Vec<Signal>>>,
}

impl CollectingNotifier {
    /// Creates an empty notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the signals received so far.
    #[must_use]
    pub fn signals(&self) -> Vec<Signal> {
        self.signals.lock().unwrap().clone()
    }

    /// Drops all recorded signals.
    pub fn clear(&self) {
        self.signals.lock().unwrap().clear();
    }
}

#[async_trait]
impl Notifier for CollectingNotifier {
    async fn registration_confirmed(&self, registration: &Registration) {
        self.signals
            .lock()
            .unwrap()
            .push(Signal::Confirmed(registration.id));
    }

    async fn registration_waitlisted(&self, registration: &Registration) {
        self.signals
            .lock()
            .unwrap()
            .push(Signal::Waitlisted(registration.id, registration.waitlist_position));
    }

    async fn registration_promoted(&self, registration: &Registration) {
        self.signals
            .lock()
            .unwrap()
            .push(Signal::Promoted(registration.id));
    }

    async fn registration_cancelled(&self, registration: &Registration) {
        self.signals
            .lock()
            .unwrap()
            .push(Signal::Cancelled(registration.id));
    }
}
