//! Default notifier implementation.
//!
//! Downstream delivery (email, push) is owned by the platform's
//! notification service; this service only emits the signal. The tracing
//! notifier records each signal as a structured log line that the delivery
//! pipeline tails. Failures never propagate back into the state change.

use async_trait::async_trait;
use clubdesk_core::types::Registration;
use clubdesk_core::Notifier;

/// Emits lifecycle signals as structured log events.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn registration_confirmed(&self, registration: &Registration) {
        tracing::info!(
            target: "clubdesk::notify",
            registration = %registration.id,
            event = %registration.event_id,
            registrant = %registration.registrant.name,
            "signal: registration confirmed"
        );
    }

    async fn registration_waitlisted(&self, registration: &Registration) {
        tracing::info!(
            target: "clubdesk::notify",
            registration = %registration.id,
            event = %registration.event_id,
            position = registration.waitlist_position,
            "signal: registration waitlisted"
        );
    }

    async fn registration_promoted(&self, registration: &Registration) {
        tracing::info!(
            target: "clubdesk::notify",
            registration = %registration.id,
            event = %registration.event_id,
            "signal: registration promoted from waitlist"
        );
    }

    async fn registration_cancelled(&self, registration: &Registration) {
        tracing::info!(
            target: "clubdesk::notify",
            registration = %registration.id,
            event = %registration.event_id,
            "signal: registration cancelled"
        );
    }
}
