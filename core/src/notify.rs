//! Notification seam.
//!
//! The registration manager signals a [`Notifier`] after admission,
//! promotion and cancellation. Delivery is fire-and-forget: a failed or
//! slow notification must never roll back the state change that triggered
//! it, so the methods are infallible and implementations swallow (and log)
//! their own errors.

use crate::types::Registration;
use async_trait::async_trait;

/// Receives signals about registration lifecycle transitions.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// A registration was admitted with a confirmed slot.
    async fn registration_confirmed(&self, registration: &Registration);

    /// A registration was admitted onto the waitlist.
    async fn registration_waitlisted(&self, registration: &Registration);

    /// A waitlisted registration was promoted to confirmed.
    async fn registration_promoted(&self, registration: &Registration);

    /// A registration was cancelled.
    async fn registration_cancelled(&self, registration: &Registration);
}

/// A notifier that drops every signal. Default wiring for tools and tests
/// that do not care about notifications.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn registration_confirmed(&self, _registration: &Registration) {}

    async fn registration_waitlisted(&self, _registration: &Registration) {}

    async fn registration_promoted(&self, _registration: &Registration) {}

    async fn registration_cancelled(&self, _registration: &Registration) {}
}
