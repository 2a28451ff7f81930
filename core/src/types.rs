//! Domain types for the registration core.
//!
//! Value objects, entities, and status enums shared by every component:
//! events with pricing tiers, registrations with their admission status and
//! price snapshot, and the payment rows backing the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing `Uuid`.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner `Uuid`.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for a tenant organization.
    OrgId
}

uuid_id! {
    /// Unique identifier for a sporting event (tournament, camp, program).
    EventId
}

uuid_id! {
    /// Unique identifier for a pricing tier.
    TierId
}

uuid_id! {
    /// Unique identifier for a registration.
    RegistrationId
}

uuid_id! {
    /// Unique identifier for a payment transaction.
    PaymentId
}

uuid_id! {
    /// Unique identifier for the person being registered.
    RegistrantId
}

// ============================================================================
// Money (integer minor currency units; no floating point)
// ============================================================================

/// An amount in minor currency units (cents, pence, ...).
///
/// Amounts are unsigned: the ledger never stores negative balances, and
/// refunds are tracked as a separate `refunded_amount` on each payment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from minor units.
    #[must_use]
    pub const fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Returns the amount in minor units.
    #[must_use]
    pub const fn minor(&self) -> u64 {
        self.0
    }

    /// Checks whether the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two amounts, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }

    /// Subtracts `other`, returning `None` if the result would be negative.
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        if self.0 >= other.0 {
            Some(Self(self.0 - other.0))
        } else {
            None
        }
    }

    /// Subtracts `other`, clamping at zero.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Audience
// ============================================================================

/// Who a pricing tier applies to, and which group a registrant belongs to.
///
/// A `General` tier matches every registrant; a `Members` tier matches only
/// registrants carrying the `Members` audience.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    /// Open to anyone.
    General,
    /// Restricted to organization members.
    Members,
}

impl Audience {
    /// Stable string form used in storage and on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Members => "members",
        }
    }

    /// Parses the stable string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "general" => Some(Self::General),
            "members" => Some(Self::Members),
            _ => None,
        }
    }
}

// ============================================================================
// Events and pricing tiers
// ============================================================================

/// A paid sporting event instance (tournament, camp, program session).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SportEvent {
    /// Unique event identifier.
    pub id: EventId,
    /// Owning tenant organization.
    pub org_id: OrgId,
    /// Event name shown to registrants.
    pub name: String,
    /// When the event takes place.
    pub starts_at: DateTime<Utc>,
    /// Confirmed-registration capacity; `None` means unlimited.
    pub max_capacity: Option<u32>,
    /// Whether a waitlist opens once capacity is reached.
    pub waitlist_enabled: bool,
    /// Waitlist capacity; `None` means unlimited. Only meaningful when
    /// `waitlist_enabled` is set.
    pub max_waitlist_size: Option<u32>,
    /// ISO 4217 currency code all tier prices are denominated in.
    pub currency: String,
    /// Pricing tiers; resolution picks at most one per instant (see
    /// [`crate::pricing`]).
    pub pricing_tiers: Vec<PricingTier>,
    /// When the event was created.
    pub created_at: DateTime<Utc>,
}

/// A time-bounded price rule attached to an event.
///
/// The effective window is half-open: `[effective_from, effective_to)`.
/// An unset bound is unbounded on that side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTier {
    /// Unique tier identifier.
    pub id: TierId,
    /// Display label ("Early bird", "Member rate", ...).
    pub label: String,
    /// Price in minor currency units.
    pub price: Money,
    /// Inclusive start of the effective window.
    pub effective_from: Option<DateTime<Utc>>,
    /// Exclusive end of the effective window.
    pub effective_to: Option<DateTime<Utc>>,
    /// Which registrants the tier applies to.
    pub audience: Audience,
    /// Explicit tie-break rank; higher wins.
    pub priority: i32,
}

impl PricingTier {
    /// Checks whether the tier's effective window contains `at`.
    #[must_use]
    pub fn covers(&self, at: DateTime<Utc>) -> bool {
        let after_start = self.effective_from.is_none_or(|from| at >= from);
        let before_end = self.effective_to.is_none_or(|to| at < to);
        after_start && before_end
    }

    /// Checks whether the tier applies to a registrant of `audience`.
    #[must_use]
    pub const fn applies_to(&self, audience: Audience) -> bool {
        matches!(self.audience, Audience::General) || matches!(audience, Audience::Members)
    }
}

// ============================================================================
// Registrations
// ============================================================================

/// The person a registration is for, as supplied by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registrant {
    /// Identifier in the surrounding platform (athlete, coach, guardian).
    pub id: RegistrantId,
    /// Display name.
    pub name: String,
    /// Contact email, if known.
    pub email: Option<String>,
    /// Audience group for pricing resolution.
    pub audience: Audience,
}

/// Lifecycle status of a registration.
///
/// Transitions: `Pending → {Confirmed, Waitlisted}` at admission,
/// `Waitlisted → Confirmed` on promotion, and any non-terminal status
/// `→ Cancelled`. Nothing re-enters `Pending`; `Cancelled` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// Created but not yet admitted (transient; never stored after admission).
    Pending,
    /// Holds a guaranteed capacity slot.
    Confirmed,
    /// Queued in FIFO order for a slot that may free up.
    Waitlisted,
    /// Terminal; the row is kept for financial history, never deleted.
    Cancelled,
}

impl RegistrationStatus {
    /// Stable string form used in storage and on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Waitlisted => "waitlisted",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses the stable string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "waitlisted" => Some(Self::Waitlisted),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether a registration in this status may still be cancelled.
    #[must_use]
    pub const fn cancellable(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// Payment state of a registration, derived from the ledger.
///
/// Never stored independently; always recomputed from the payment rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    /// Nothing captured yet.
    Pending,
    /// Some, but not all, of the price captured.
    Partial,
    /// Fully paid.
    Paid,
}

/// A registration of one registrant for one event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    /// Unique registration identifier.
    pub id: RegistrationId,
    /// Owning tenant organization.
    pub org_id: OrgId,
    /// Event registered for.
    pub event_id: EventId,
    /// Who the registration is for.
    pub registrant: Registrant,
    /// Current lifecycle status.
    pub status: RegistrationStatus,
    /// Price snapshot resolved at registration time. Immutable afterwards;
    /// later tier edits never touch it.
    pub price: Money,
    /// Running total captured by the ledger (`Σ amount − refunded_amount`).
    pub paid_amount: Money,
    /// FIFO position, set if and only if the status is `Waitlisted`.
    /// Positions for an event are contiguous from 1.
    pub waitlist_position: Option<u32>,
    /// When the registration request arrived.
    pub registered_at: DateTime<Utc>,
    /// When the registration was confirmed (at admission or promotion).
    pub confirmed_at: Option<DateTime<Utc>>,
    /// When the registration was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Caller-supplied cancellation reason.
    pub cancel_reason: Option<String>,
}

impl Registration {
    /// Derives the payment state from the ledger totals.
    #[must_use]
    pub fn payment_state(&self) -> PaymentState {
        crate::ledger::payment_state(self.paid_amount, self.price)
    }
}

// ============================================================================
// Payments
// ============================================================================

/// How a payment was made.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card payment.
    Card,
    /// Bank transfer.
    BankTransfer,
    /// Cash at the desk.
    Cash,
    /// Voucher or credit note.
    Voucher,
}

impl PaymentMethod {
    /// Stable string form used in storage and on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::BankTransfer => "bank_transfer",
            Self::Cash => "cash",
            Self::Voucher => "voucher",
        }
    }

    /// Parses the stable string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "card" => Some(Self::Card),
            "bank_transfer" => Some(Self::BankTransfer),
            "cash" => Some(Self::Cash),
            "voucher" => Some(Self::Voucher),
            _ => None,
        }
    }
}

/// Status of an individual payment transaction.
///
/// Payments recorded through the ledger arrive as confirmed facts and start
/// at `Paid`; the remaining variants exist for rows imported from upstream
/// processors. Only `Paid`, `PartiallyRefunded` and `Refunded` rows count
/// toward a registration's `paid_amount`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTxStatus {
    /// Announced but not confirmed.
    Pending,
    /// In flight at the processor.
    Processing,
    /// Funds captured.
    Paid,
    /// Funds captured, part refunded.
    PartiallyRefunded,
    /// Fully refunded.
    Refunded,
    /// Confirmation failed.
    Failed,
    /// Abandoned before confirmation.
    Cancelled,
}

impl PaymentTxStatus {
    /// Stable string form used in storage and on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Paid => "paid",
            Self::PartiallyRefunded => "partially_refunded",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses the stable string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "paid" => Some(Self::Paid),
            "partially_refunded" => Some(Self::PartiallyRefunded),
            "refunded" => Some(Self::Refunded),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// A payment transaction recorded against a registration.
///
/// Rows are append-only: once the funds transfer is confirmed, only the
/// refund fields may change, and only through the refund processor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique payment identifier.
    pub id: PaymentId,
    /// Owning tenant organization.
    pub org_id: OrgId,
    /// Registration the payment is for.
    pub registration_id: RegistrationId,
    /// Captured amount in minor units; always positive.
    pub amount: Money,
    /// How the payment was made.
    pub method: PaymentMethod,
    /// Transaction status.
    pub status: PaymentTxStatus,
    /// When the funds transfer took place.
    pub payment_date: DateTime<Utc>,
    /// Total refunded so far; `0 ≤ refunded_amount ≤ amount`.
    pub refunded_amount: Money,
    /// When the most recent refund was applied.
    pub refunded_at: Option<DateTime<Utc>>,
    /// Caller-supplied refund reason (latest wins).
    pub refund_reason: Option<String>,
    /// When the row was recorded by the ledger.
    pub recorded_at: DateTime<Utc>,
}

impl Payment {
    /// The amount still refundable on this payment.
    #[must_use]
    pub fn refundable(&self) -> Money {
        self.amount.saturating_sub(self.refunded_amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn money_checked_arithmetic() {
        let a = Money::from_minor(1_000);
        let b = Money::from_minor(250);
        assert_eq!(a.checked_add(b), Some(Money::from_minor(1_250)));
        assert_eq!(a.checked_sub(b), Some(Money::from_minor(750)));
        assert_eq!(b.checked_sub(a), None);
        assert_eq!(b.saturating_sub(a), Money::ZERO);
        assert_eq!(Money::from_minor(u64::MAX).checked_add(b), None);
    }

    #[test]
    fn tier_window_is_half_open() {
        let from = "2024-01-01T00:00:00Z".parse().unwrap();
        let to = "2024-02-01T00:00:00Z".parse().unwrap();
        let tier = PricingTier {
            id: TierId::new(),
            label: "Early bird".to_string(),
            price: Money::from_minor(100),
            effective_from: Some(from),
            effective_to: Some(to),
            audience: Audience::General,
            priority: 0,
        };

        assert!(tier.covers(from));
        assert!(tier.covers("2024-01-15T12:00:00Z".parse().unwrap()));
        assert!(!tier.covers(to));
        assert!(!tier.covers("2023-12-31T23:59:59Z".parse().unwrap()));
    }

    #[test]
    fn member_tier_excludes_general_audience() {
        let tier = PricingTier {
            id: TierId::new(),
            label: "Member rate".to_string(),
            price: Money::from_minor(100),
            effective_from: None,
            effective_to: None,
            audience: Audience::Members,
            priority: 0,
        };

        assert!(tier.applies_to(Audience::Members));
        assert!(!tier.applies_to(Audience::General));
    }

    #[test]
    fn status_round_trips_through_stable_strings() {
        for status in [
            RegistrationStatus::Pending,
            RegistrationStatus::Confirmed,
            RegistrationStatus::Waitlisted,
            RegistrationStatus::Cancelled,
        ] {
            assert_eq!(RegistrationStatus::parse(status.as_str()), Some(status));
        }
        for status in [
            PaymentTxStatus::Pending,
            PaymentTxStatus::Processing,
            PaymentTxStatus::Paid,
            PaymentTxStatus::PartiallyRefunded,
            PaymentTxStatus::Refunded,
            PaymentTxStatus::Failed,
            PaymentTxStatus::Cancelled,
        ] {
            assert_eq!(PaymentTxStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RegistrationStatus::parse("unknown"), None);
    }
}
