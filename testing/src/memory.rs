//! In-memory registration store for fast, deterministic testing.

#![allow(clippy::unwrap_used)] // Test infrastructure unwraps its own mutex

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clubdesk_core::error::{RegistrationError, Result};
use clubdesk_core::store::{
    CancellationOutcome, NewEvent, Page, PageOf, PaymentReceipt, RefundOutcome, RegistrationFilter,
    RegistrationStore,
};
use clubdesk_core::types::{
    EventId, Money, OrgId, Payment, PaymentId, PaymentMethod, PaymentTxStatus, PricingTier,
    Registrant, Registration, RegistrationId, RegistrationStatus, SportEvent, TierId,
};
use clubdesk_core::{admission, ledger, waitlist};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Inner {
    events: HashMap<EventId, SportEvent>,
    registrations: HashMap<RegistrationId, Registration>,
    payments: HashMap<PaymentId, Payment>,
}

impl Inner {
    fn event(&self, org_id: OrgId, event_id: EventId) -> Result<&SportEvent> {
        self.events
            .get(&event_id)
            .filter(|e| e.org_id == org_id)
            .ok_or(RegistrationError::EventNotFound(event_id))
    }

    fn registration(&self, org_id: OrgId, id: RegistrationId) -> Result<&Registration> {
        self.registrations
            .get(&id)
            .filter(|r| r.org_id == org_id)
            .ok_or(RegistrationError::RegistrationNotFound(id))
    }

    fn counts(&self, event_id: EventId) -> (u32, u32) {
        let mut confirmed = 0_u32;
        let mut waitlisted = 0_u32;
        for r in self.registrations.values().filter(|r| r.event_id == event_id) {
            match r.status {
                RegistrationStatus::Confirmed => confirmed += 1,
                RegistrationStatus::Waitlisted => waitlisted += 1,
                RegistrationStatus::Pending | RegistrationStatus::Cancelled => {}
            }
        }
        (confirmed, waitlisted)
    }

    fn registration_payments(&self, id: RegistrationId) -> Vec<Payment> {
        let mut rows: Vec<Payment> = self
            .payments
            .values()
            .filter(|p| p.registration_id == id)
            .cloned()
            .collect();
        rows.sort_by_key(|p| (p.recorded_at, *p.id.as_uuid()));
        rows
    }

    fn assert_contiguous(&self, event_id: EventId) {
        let positions: Vec<u32> = self
            .registrations
            .values()
            .filter(|r| r.event_id == event_id && r.status == RegistrationStatus::Waitlisted)
            .filter_map(|r| r.waitlist_position)
            .collect();
        debug_assert!(
            waitlist::is_contiguous(&positions),
            "waitlist positions out of shape: {positions:?}"
        );
    }
}

/// Mutex-guarded in-memory implementation of the store seam.
///
/// The single mutex makes every operation an atomic unit, giving the same
/// observable guarantees as the transactional Postgres store. Clones share
/// state, matching pool-handle semantics.
#[derive(Clone, Default)]
pub struct InMemoryRegistrationStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryRegistrationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all state, for reuse between test cases.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.events.clear();
        inner.registrations.clear();
        inner.payments.clear();
    }
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn insert_event(&self, org_id: OrgId, event: NewEvent) -> Result<SportEvent> {
        let mut inner = self.inner.lock().unwrap();
        let stored = SportEvent {
            id: EventId::new(),
            org_id,
            name: event.name,
            starts_at: event.starts_at,
            max_capacity: event.max_capacity,
            waitlist_enabled: event.waitlist_enabled,
            max_waitlist_size: event.max_waitlist_size,
            currency: event.currency,
            pricing_tiers: event
                .pricing_tiers
                .into_iter()
                .map(|t| PricingTier {
                    id: TierId::new(),
                    label: t.label,
                    price: t.price,
                    effective_from: t.effective_from,
                    effective_to: t.effective_to,
                    audience: t.audience,
                    priority: t.priority,
                })
                .collect(),
            created_at: Utc::now(),
        };
        inner.events.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn fetch_event(&self, org_id: OrgId, event_id: EventId) -> Result<SportEvent> {
        let inner = self.inner.lock().unwrap();
        inner.event(org_id, event_id).cloned()
    }

    async fn admit_registration(
        &self,
        org_id: OrgId,
        event_id: EventId,
        registrant: Registrant,
        price: Money,
        requested_at: DateTime<Utc>,
    ) -> Result<Registration> {
        let mut inner = self.inner.lock().unwrap();
        let event = inner.event(org_id, event_id)?.clone();
        let (confirmed, waitlisted) = inner.counts(event_id);
        let decision = admission::decide(&event, confirmed, waitlisted)?;

        let registration = match decision {
            admission::AdmissionDecision::Confirmed => Registration {
                id: RegistrationId::new(),
                org_id,
                event_id,
                registrant,
                status: RegistrationStatus::Confirmed,
                price,
                paid_amount: Money::ZERO,
                waitlist_position: None,
                registered_at: requested_at,
                confirmed_at: Some(requested_at),
                cancelled_at: None,
                cancel_reason: None,
            },
            admission::AdmissionDecision::Waitlisted { position } => Registration {
                id: RegistrationId::new(),
                org_id,
                event_id,
                registrant,
                status: RegistrationStatus::Waitlisted,
                price,
                paid_amount: Money::ZERO,
                waitlist_position: Some(position),
                registered_at: requested_at,
                confirmed_at: None,
                cancelled_at: None,
                cancel_reason: None,
            },
        };

        inner.registrations.insert(registration.id, registration.clone());
        inner.assert_contiguous(event_id);
        Ok(registration)
    }

    async fn cancel_registration(
        &self,
        org_id: OrgId,
        registration_id: RegistrationId,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<CancellationOutcome> {
        let mut inner = self.inner.lock().unwrap();
        let current = inner.registration(org_id, registration_id)?.clone();

        if !current.status.cancellable() {
            return Err(RegistrationError::InvalidRegistrationState {
                id: registration_id,
                status: current.status.as_str(),
                reason: "already cancelled".to_string(),
            });
        }

        let prior_status = current.status;
        let prior_position = current.waitlist_position;
        let event_id = current.event_id;

        let cancelled = {
            let entry = inner.registrations.get_mut(&registration_id).unwrap();
            entry.status = RegistrationStatus::Cancelled;
            entry.cancelled_at = Some(at);
            entry.cancel_reason = reason;
            entry.waitlist_position = None;
            entry.clone()
        };

        let promoted = match prior_status {
            RegistrationStatus::Confirmed => {
                // A confirmed slot freed up: promote the waitlist head and
                // shift the rest forward.
                let head = inner
                    .registrations
                    .values()
                    .filter(|r| {
                        r.event_id == event_id && r.status == RegistrationStatus::Waitlisted
                    })
                    .min_by_key(|r| r.waitlist_position.unwrap_or(u32::MAX))
                    .map(|r| r.id);

                head.map(|head_id| {
                    let head_position = {
                        let entry = inner.registrations.get_mut(&head_id).unwrap();
                        let position = entry.waitlist_position.unwrap_or(1);
                        entry.status = RegistrationStatus::Confirmed;
                        entry.confirmed_at = Some(at);
                        entry.waitlist_position = None;
                        position
                    };
                    shift_positions(&mut inner, event_id, head_position);
                    inner.registrations[&head_id].clone()
                })
            }
            RegistrationStatus::Waitlisted => {
                if let Some(position) = prior_position {
                    shift_positions(&mut inner, event_id, position);
                }
                None
            }
            RegistrationStatus::Pending | RegistrationStatus::Cancelled => None,
        };

        inner.assert_contiguous(event_id);
        Ok(CancellationOutcome { cancelled, promoted })
    }

    async fn fetch_registration(
        &self,
        org_id: OrgId,
        registration_id: RegistrationId,
    ) -> Result<Registration> {
        let inner = self.inner.lock().unwrap();
        inner.registration(org_id, registration_id).cloned()
    }

    async fn list_registrations(
        &self,
        org_id: OrgId,
        event_id: EventId,
        filter: RegistrationFilter,
        page: Page,
    ) -> Result<PageOf<Registration>> {
        let inner = self.inner.lock().unwrap();
        inner.event(org_id, event_id)?;

        let mut items: Vec<Registration> = inner
            .registrations
            .values()
            .filter(|r| r.event_id == event_id)
            .filter(|r| filter.status.is_none_or(|status| r.status == status))
            .cloned()
            .collect();
        items.sort_by_key(|r| (r.registered_at, *r.id.as_uuid()));

        let total = items.len() as u64;
        let items = items
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect();
        Ok(PageOf { items, total })
    }

    async fn waitlist(&self, org_id: OrgId, event_id: EventId) -> Result<Vec<Registration>> {
        let inner = self.inner.lock().unwrap();
        inner.event(org_id, event_id)?;

        let mut items: Vec<Registration> = inner
            .registrations
            .values()
            .filter(|r| r.event_id == event_id && r.status == RegistrationStatus::Waitlisted)
            .cloned()
            .collect();
        items.sort_by_key(|r| r.waitlist_position.unwrap_or(u32::MAX));
        Ok(items)
    }

    async fn record_payment(
        &self,
        org_id: OrgId,
        registration_id: RegistrationId,
        amount: Money,
        method: PaymentMethod,
        payment_date: DateTime<Utc>,
    ) -> Result<PaymentReceipt> {
        let mut inner = self.inner.lock().unwrap();
        let registration = inner.registration(org_id, registration_id)?.clone();

        let rows = inner.registration_payments(registration_id);
        let current_paid = ledger::paid_amount(&rows);
        ledger::check_payment(&registration, current_paid, amount)?;

        let payment = Payment {
            id: PaymentId::new(),
            org_id,
            registration_id,
            amount,
            method,
            status: PaymentTxStatus::Paid,
            payment_date,
            refunded_amount: Money::ZERO,
            refunded_at: None,
            refund_reason: None,
            recorded_at: Utc::now(),
        };
        inner.payments.insert(payment.id, payment.clone());

        let rows = inner.registration_payments(registration_id);
        let paid_amount = ledger::paid_amount(&rows);
        inner
            .registrations
            .get_mut(&registration_id)
            .unwrap()
            .paid_amount = paid_amount;

        Ok(PaymentReceipt {
            payment,
            paid_amount,
            outstanding: registration.price.saturating_sub(paid_amount),
            payment_state: ledger::payment_state(paid_amount, registration.price),
        })
    }

    async fn list_payments(
        &self,
        org_id: OrgId,
        registration_id: RegistrationId,
    ) -> Result<Vec<Payment>> {
        let inner = self.inner.lock().unwrap();
        inner.registration(org_id, registration_id)?;
        Ok(inner.registration_payments(registration_id))
    }

    async fn process_refund(
        &self,
        org_id: OrgId,
        payment_id: PaymentId,
        amount: Money,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<RefundOutcome> {
        let mut inner = self.inner.lock().unwrap();
        let payment = inner
            .payments
            .get(&payment_id)
            .filter(|p| p.org_id == org_id)
            .cloned()
            .ok_or(RegistrationError::PaymentNotFound(payment_id))?;

        ledger::check_refund(&payment, amount)?;

        let registration_id = payment.registration_id;
        let price = inner.registrations[&registration_id].price;

        let updated = {
            let entry = inner.payments.get_mut(&payment_id).unwrap();
            ledger::apply_refund(entry, amount, reason, at);
            entry.clone()
        };

        let rows = inner.registration_payments(registration_id);
        let new_paid_amount = ledger::paid_amount(&rows);
        inner
            .registrations
            .get_mut(&registration_id)
            .unwrap()
            .paid_amount = new_paid_amount;

        Ok(RefundOutcome {
            payment: updated,
            new_paid_amount,
            payment_state: ledger::payment_state(new_paid_amount, price),
        })
    }
}

/// Shifts waitlist positions after the entry at `removed` left the list.
fn shift_positions(inner: &mut Inner, event_id: EventId, removed: u32) {
    for r in inner
        .registrations
        .values_mut()
        .filter(|r| r.event_id == event_id && r.status == RegistrationStatus::Waitlisted)
    {
        if let Some(position) = r.waitlist_position {
            r.waitlist_position = Some(waitlist::position_after_removal(position, removed));
        }
    }
}
