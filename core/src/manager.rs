//! Registration manager.
//!
//! Orchestrates the components over the storage and notification seams:
//! price resolution feeds the atomic admission, cancellations trigger
//! waitlist effects inside the store, and lifecycle notifications fire
//! after the state change committed.
//!
//! Cancellation and refunds stay decoupled in both directions: cancelling
//! a registration never refunds its payments, and refunding never cancels
//! the registration or releases capacity. They are distinct business
//! decisions with independent authorization; each requires its own
//! explicit call.

use crate::error::{RegistrationError, Result};
use crate::notify::Notifier;
use crate::pricing;
use crate::store::{
    CancellationOutcome, NewEvent, Page, PageOf, PaymentReceipt, RefundOutcome, RegistrationFilter,
    RegistrationStore,
};
use crate::types::{
    EventId, Money, OrgId, Payment, PaymentId, PaymentMethod, Registrant, Registration,
    RegistrationId, RegistrationStatus, SportEvent,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Entry point for all registration, payment and refund operations.
#[derive(Clone)]
pub struct RegistrationManager {
    store: Arc<dyn RegistrationStore>,
    notifier: Arc<dyn Notifier>,
}

impl RegistrationManager {
    /// Creates a manager over the given store and notifier.
    #[must_use]
    pub fn new(store: Arc<dyn RegistrationStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Creates an event after validating its configuration.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::Validation`] for inconsistent configuration,
    /// plus any storage error.
    pub async fn create_event(&self, org_id: OrgId, event: NewEvent) -> Result<SportEvent> {
        validate_event(&event)?;
        self.store.insert_event(org_id, event).await
    }

    /// Loads an event with its pricing tiers.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::EventNotFound`].
    pub async fn event(&self, org_id: OrgId, event_id: EventId) -> Result<SportEvent> {
        self.store.fetch_event(org_id, event_id).await
    }

    /// Registers a registrant for an event.
    ///
    /// Resolves the price snapshot for `requested_at`, then runs the atomic
    /// admission check in the store: confirmed while capacity remains,
    /// waitlisted while the waitlist has room, refused otherwise.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::EventNotFound`],
    /// [`RegistrationError::PricingUnresolved`], or
    /// [`RegistrationError::CapacityExceeded`].
    #[tracing::instrument(skip(self, registrant), fields(%org_id, %event_id))]
    pub async fn create_registration(
        &self,
        org_id: OrgId,
        event_id: EventId,
        registrant: Registrant,
        requested_at: DateTime<Utc>,
    ) -> Result<Registration> {
        let event = self.store.fetch_event(org_id, event_id).await?;
        let resolved = pricing::resolve_price(&event, requested_at, registrant.audience)?;

        tracing::debug!(tier = %resolved.tier_id, price = %resolved.price, "price resolved");

        let registration = self
            .store
            .admit_registration(org_id, event_id, registrant, resolved.price, requested_at)
            .await?;

        match registration.status {
            RegistrationStatus::Confirmed => {
                tracing::info!(registration = %registration.id, "registration confirmed");
                self.notifier.registration_confirmed(&registration).await;
            }
            RegistrationStatus::Waitlisted => {
                tracing::info!(
                    registration = %registration.id,
                    position = registration.waitlist_position,
                    "registration waitlisted"
                );
                self.notifier.registration_waitlisted(&registration).await;
            }
            RegistrationStatus::Pending | RegistrationStatus::Cancelled => {}
        }

        Ok(registration)
    }

    /// Cancels a registration.
    ///
    /// Cancelling a confirmed registration frees its slot and promotes the
    /// waitlist head, atomically. Cancelling a waitlisted registration
    /// closes the position gap. Payments are untouched; refunds are a
    /// separate [`process_refund`](Self::process_refund) call.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::RegistrationNotFound`], or
    /// [`RegistrationError::InvalidRegistrationState`] when already
    /// cancelled.
    #[tracing::instrument(skip(self, reason), fields(%org_id, %registration_id))]
    pub async fn cancel_registration(
        &self,
        org_id: OrgId,
        registration_id: RegistrationId,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<CancellationOutcome> {
        let outcome = self
            .store
            .cancel_registration(org_id, registration_id, reason, at)
            .await?;

        tracing::info!(
            promoted = ?outcome.promoted.as_ref().map(|r| r.id),
            "registration cancelled"
        );

        self.notifier.registration_cancelled(&outcome.cancelled).await;
        if let Some(promoted) = &outcome.promoted {
            self.notifier.registration_promoted(promoted).await;
        }

        Ok(outcome)
    }

    /// Loads one registration.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::RegistrationNotFound`].
    pub async fn registration(
        &self,
        org_id: OrgId,
        registration_id: RegistrationId,
    ) -> Result<Registration> {
        self.store.fetch_registration(org_id, registration_id).await
    }

    /// Lists an event's registrations.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::EventNotFound`].
    pub async fn list_registrations(
        &self,
        org_id: OrgId,
        event_id: EventId,
        filter: RegistrationFilter,
        page: Page,
    ) -> Result<PageOf<Registration>> {
        self.store
            .list_registrations(org_id, event_id, filter, page.clamped())
            .await
    }

    /// Returns an event's waitlist in FIFO order.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::EventNotFound`].
    pub async fn waitlist(&self, org_id: OrgId, event_id: EventId) -> Result<Vec<Registration>> {
        self.store.waitlist(org_id, event_id).await
    }

    /// Records a confirmed payment against a registration.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::OverpaymentRejected`],
    /// [`RegistrationError::InvalidRegistrationState`],
    /// [`RegistrationError::InvalidAmount`], or
    /// [`RegistrationError::RegistrationNotFound`].
    #[tracing::instrument(skip(self), fields(%org_id, %registration_id, %amount))]
    pub async fn record_payment(
        &self,
        org_id: OrgId,
        registration_id: RegistrationId,
        amount: Money,
        method: PaymentMethod,
        payment_date: DateTime<Utc>,
    ) -> Result<PaymentReceipt> {
        let receipt = self
            .store
            .record_payment(org_id, registration_id, amount, method, payment_date)
            .await?;
        tracing::info!(
            payment = %receipt.payment.id,
            paid_amount = %receipt.paid_amount,
            state = ?receipt.payment_state,
            "payment recorded"
        );
        Ok(receipt)
    }

    /// Lists a registration's payments, oldest first.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::RegistrationNotFound`].
    pub async fn payments(
        &self,
        org_id: OrgId,
        registration_id: RegistrationId,
    ) -> Result<Vec<Payment>> {
        self.store.list_payments(org_id, registration_id).await
    }

    /// Refunds part or all of a single payment.
    ///
    /// Capacity is not released and the registration is not cancelled;
    /// pair with [`cancel_registration`](Self::cancel_registration) when
    /// both are wanted.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::RefundExceedsBalance`],
    /// [`RegistrationError::InvalidPaymentState`],
    /// [`RegistrationError::InvalidAmount`], or
    /// [`RegistrationError::PaymentNotFound`].
    #[tracing::instrument(skip(self, reason), fields(%org_id, %payment_id, %amount))]
    pub async fn process_refund(
        &self,
        org_id: OrgId,
        payment_id: PaymentId,
        amount: Money,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<RefundOutcome> {
        let outcome = self
            .store
            .process_refund(org_id, payment_id, amount, reason, at)
            .await?;
        tracing::info!(
            new_paid_amount = %outcome.new_paid_amount,
            state = ?outcome.payment_state,
            "refund processed"
        );
        Ok(outcome)
    }
}

/// Validates event configuration before persisting it.
fn validate_event(event: &NewEvent) -> Result<()> {
    if event.name.trim().is_empty() {
        return Err(RegistrationError::Validation(
            "event name must not be empty".to_string(),
        ));
    }
    if event.currency.len() != 3 || !event.currency.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(RegistrationError::Validation(format!(
            "currency must be a 3-letter ISO code, got {:?}",
            event.currency
        )));
    }
    if !event.waitlist_enabled && event.max_waitlist_size.is_some() {
        return Err(RegistrationError::Validation(
            "max_waitlist_size requires waitlist_enabled".to_string(),
        ));
    }
    for tier in &event.pricing_tiers {
        if tier.label.trim().is_empty() {
            return Err(RegistrationError::Validation(
                "tier label must not be empty".to_string(),
            ));
        }
        if let (Some(from), Some(to)) = (tier.effective_from, tier.effective_to) {
            if from >= to {
                return Err(RegistrationError::Validation(format!(
                    "tier {:?} has an empty effective window",
                    tier.label
                )));
            }
        }
    }
    Ok(())
}
