//! Storage seam for the registration core.
//!
//! [`RegistrationStore`] is the contract between the
//! [`RegistrationManager`](crate::manager::RegistrationManager) and durable
//! storage. It is deliberately high-level: each mutating operation is one
//! atomic unit, because the invariants it protects (capacity, waitlist
//! contiguity, payment conservation) only hold if the read-decide-write
//! sequence cannot interleave with a conflicting writer.
//!
//! # Atomicity contract
//!
//! - [`admit_registration`](RegistrationStore::admit_registration) must
//!   re-read the confirmed count and waitlist size and perform the insert
//!   without another admission for the same event interleaving. Two
//!   concurrent requests near the capacity boundary must never both be
//!   confirmed.
//! - [`cancel_registration`](RegistrationStore::cancel_registration) must
//!   commit the status change together with the waitlist effect it
//!   triggers (promotion of the head, or gap-closing renumbering) — or not
//!   at all.
//! - [`record_payment`](RegistrationStore::record_payment) and
//!   [`process_refund`](RegistrationStore::process_refund) must guard the
//!   read-modify-write of `paid_amount`/`refunded_amount` so two
//!   concurrent calls cannot both pass the balance checks.
//!
//! All decisions inside those units come from the pure functions in
//! [`admission`](crate::admission), [`ledger`](crate::ledger) and
//! [`waitlist`](crate::waitlist).
//!
//! # Implementations
//!
//! - `PgRegistrationStore` (crate `clubdesk-postgres`): transactions and
//!   row locks on PostgreSQL.
//! - `InMemoryRegistrationStore` (crate `clubdesk-testing`): a mutex over
//!   plain maps, for fast deterministic tests.

use crate::error::Result;
use crate::types::{
    EventId, Money, OrgId, Payment, PaymentId, PaymentMethod, PaymentState, Registrant,
    Registration, RegistrationId, RegistrationStatus, SportEvent,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Input for creating an event with its pricing tiers.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewEvent {
    /// Event name.
    pub name: String,
    /// When the event takes place.
    pub starts_at: DateTime<Utc>,
    /// Confirmed capacity; `None` = unlimited.
    pub max_capacity: Option<u32>,
    /// Whether a waitlist opens at capacity.
    pub waitlist_enabled: bool,
    /// Waitlist capacity; `None` = unlimited.
    pub max_waitlist_size: Option<u32>,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Pricing tiers to create with the event.
    pub pricing_tiers: Vec<NewTier>,
}

/// Input for one pricing tier of a new event.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewTier {
    /// Display label.
    pub label: String,
    /// Price in minor units.
    pub price: Money,
    /// Inclusive window start.
    pub effective_from: Option<DateTime<Utc>>,
    /// Exclusive window end.
    pub effective_to: Option<DateTime<Utc>>,
    /// Audience the tier applies to.
    pub audience: crate::types::Audience,
    /// Explicit tie-break rank.
    pub priority: i32,
}

/// Status filter for registration listings.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct RegistrationFilter {
    /// Keep only registrations in this status.
    pub status: Option<RegistrationStatus>,
}

/// Limit/offset pagination for listings.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Page {
    /// Maximum items to return; clamped to [`Page::MAX_LIMIT`].
    pub limit: u32,
    /// Items to skip.
    pub offset: u32,
}

impl Page {
    /// Default page size.
    pub const DEFAULT_LIMIT: u32 = 50;
    /// Hard ceiling on page size.
    pub const MAX_LIMIT: u32 = 200;

    /// Returns the page with the limit clamped to the allowed range.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            limit: self.limit.clamp(1, Self::MAX_LIMIT),
            offset: self.offset,
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// One page of a listing plus the unpaginated total.
#[derive(Clone, Debug, Serialize)]
pub struct PageOf<T> {
    /// The page items.
    pub items: Vec<T>,
    /// Total matching rows, ignoring pagination.
    pub total: u64,
}

/// Result of a cancellation, including any waitlist promotion it caused.
#[derive(Clone, Debug)]
pub struct CancellationOutcome {
    /// The registration after cancellation.
    pub cancelled: Registration,
    /// The head-of-waitlist registration promoted into the freed slot, if
    /// the cancelled registration held a confirmed slot and the waitlist
    /// was non-empty.
    pub promoted: Option<Registration>,
}

/// Result of recording a payment.
#[derive(Clone, Debug)]
pub struct PaymentReceipt {
    /// The appended payment row.
    pub payment: Payment,
    /// The registration's recomputed running total.
    pub paid_amount: Money,
    /// The remaining balance (`price − paid_amount`).
    pub outstanding: Money,
    /// The derived payment state after this payment.
    pub payment_state: PaymentState,
}

/// Result of processing a refund.
#[derive(Clone, Debug)]
pub struct RefundOutcome {
    /// The payment row after the refund was applied.
    pub payment: Payment,
    /// The owning registration's recomputed running total.
    pub new_paid_amount: Money,
    /// The derived payment state after the refund.
    pub payment_state: PaymentState,
}

/// Durable storage for events, registrations and payments.
///
/// Every operation is scoped to the caller's organization: rows belonging
/// to another tenant behave exactly like missing rows (`*NotFound`).
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Verifies the backing store is reachable; used by readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`Storage`](crate::RegistrationError::Storage) when the
    /// store cannot be reached.
    async fn ping(&self) -> Result<()>;

    /// Persists a new event with its pricing tiers.
    ///
    /// # Errors
    ///
    /// Returns [`Storage`](crate::RegistrationError::Storage) on backend
    /// failure.
    async fn insert_event(&self, org_id: OrgId, event: NewEvent) -> Result<SportEvent>;

    /// Loads an event with its pricing tiers.
    ///
    /// # Errors
    ///
    /// [`EventNotFound`](crate::RegistrationError::EventNotFound) when the
    /// event is missing or belongs to another organization.
    async fn fetch_event(&self, org_id: OrgId, event_id: EventId) -> Result<SportEvent>;

    /// Atomically admits a registration: re-reads the confirmed count and
    /// waitlist size, applies [`admission::decide`](crate::admission::decide),
    /// and inserts the row as confirmed or waitlisted.
    ///
    /// # Errors
    ///
    /// [`CapacityExceeded`](crate::RegistrationError::CapacityExceeded)
    /// when neither slot kind is available (no row is created), or
    /// [`EventNotFound`](crate::RegistrationError::EventNotFound).
    async fn admit_registration(
        &self,
        org_id: OrgId,
        event_id: EventId,
        registrant: Registrant,
        price: Money,
        requested_at: DateTime<Utc>,
    ) -> Result<Registration>;

    /// Atomically cancels a registration and applies the waitlist effect:
    /// promotion of the head when a confirmed slot frees up, or gap-closing
    /// renumbering when a waitlisted entry leaves.
    ///
    /// # Errors
    ///
    /// [`InvalidRegistrationState`](crate::RegistrationError::InvalidRegistrationState)
    /// when already cancelled, or
    /// [`RegistrationNotFound`](crate::RegistrationError::RegistrationNotFound).
    async fn cancel_registration(
        &self,
        org_id: OrgId,
        registration_id: RegistrationId,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<CancellationOutcome>;

    /// Loads one registration.
    ///
    /// # Errors
    ///
    /// [`RegistrationNotFound`](crate::RegistrationError::RegistrationNotFound).
    async fn fetch_registration(
        &self,
        org_id: OrgId,
        registration_id: RegistrationId,
    ) -> Result<Registration>;

    /// Lists an event's registrations, filtered and paginated, ordered by
    /// `registered_at` ascending.
    ///
    /// # Errors
    ///
    /// [`EventNotFound`](crate::RegistrationError::EventNotFound).
    async fn list_registrations(
        &self,
        org_id: OrgId,
        event_id: EventId,
        filter: RegistrationFilter,
        page: Page,
    ) -> Result<PageOf<Registration>>;

    /// Returns an event's waitlist in position order.
    ///
    /// # Errors
    ///
    /// [`EventNotFound`](crate::RegistrationError::EventNotFound).
    async fn waitlist(&self, org_id: OrgId, event_id: EventId) -> Result<Vec<Registration>>;

    /// Atomically appends a payment row and recomputes the registration's
    /// `paid_amount`, rejecting overpayment before any write.
    ///
    /// # Errors
    ///
    /// [`OverpaymentRejected`](crate::RegistrationError::OverpaymentRejected),
    /// [`InvalidRegistrationState`](crate::RegistrationError::InvalidRegistrationState),
    /// [`InvalidAmount`](crate::RegistrationError::InvalidAmount), or
    /// [`RegistrationNotFound`](crate::RegistrationError::RegistrationNotFound).
    async fn record_payment(
        &self,
        org_id: OrgId,
        registration_id: RegistrationId,
        amount: Money,
        method: PaymentMethod,
        payment_date: DateTime<Utc>,
    ) -> Result<PaymentReceipt>;

    /// Lists a registration's payment rows, oldest first.
    ///
    /// # Errors
    ///
    /// [`RegistrationNotFound`](crate::RegistrationError::RegistrationNotFound).
    async fn list_payments(
        &self,
        org_id: OrgId,
        registration_id: RegistrationId,
    ) -> Result<Vec<Payment>>;

    /// Atomically applies a refund to a payment row and recomputes the
    /// owning registration's `paid_amount`.
    ///
    /// # Errors
    ///
    /// [`RefundExceedsBalance`](crate::RegistrationError::RefundExceedsBalance),
    /// [`InvalidPaymentState`](crate::RegistrationError::InvalidPaymentState),
    /// [`InvalidAmount`](crate::RegistrationError::InvalidAmount), or
    /// [`PaymentNotFound`](crate::RegistrationError::PaymentNotFound).
    async fn process_refund(
        &self,
        org_id: OrgId,
        payment_id: PaymentId,
        amount: Money,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<RefundOutcome>;
}
