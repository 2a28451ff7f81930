//! Event registration and payment reconciliation core for Clubdesk.
//!
//! This crate holds the domain model and every business rule of the
//! registration core of a multi-tenant sports-organization platform:
//!
//! - **Admission control**: capacity-checked acceptance of registrations,
//!   with an optional FIFO waitlist per event ([`admission`], [`waitlist`])
//! - **Pricing resolution**: time-windowed, audience-aware tier selection
//!   snapshotted into each registration ([`pricing`])
//! - **Payment ledger**: append-only payment records with a derived
//!   `paid_amount` and partial/paid status ([`ledger`])
//! - **Refund processing**: balance-checked refunds against individual
//!   payments ([`ledger`])
//! - **Orchestration**: the [`manager::RegistrationManager`] ties the rules
//!   together over the [`store::RegistrationStore`] seam
//!
//! # Architecture
//!
//! All invariant logic is written as pure functions in this crate so that
//! every store implementation shares one rulebook:
//!
//! ```text
//!            ┌──────────────────────┐
//!            │ RegistrationManager  │  resolve price → admit → notify
//!            └─────────┬────────────┘
//!                      │ RegistrationStore (async trait)
//!            ┌─────────┴────────────┐
//!            │  admission / ledger  │  pure decision functions
//!            │  pricing / waitlist  │
//!            └─────────┬────────────┘
//!          ┌───────────┴─────────────┐
//!   PgRegistrationStore       InMemoryRegistrationStore
//!   (clubdesk-postgres)       (clubdesk-testing)
//! ```
//!
//! Store implementations own the atomicity of each operation (transactions
//! and row locks in Postgres, a mutex in the in-memory store); the decision
//! of *what* is admissible never leaves this crate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod admission;
pub mod error;
pub mod ledger;
pub mod manager;
pub mod notify;
pub mod pricing;
pub mod store;
pub mod types;
pub mod waitlist;

pub use error::{RegistrationError, Result};
pub use manager::RegistrationManager;
pub use notify::{Notifier, NoopNotifier};
pub use store::RegistrationStore;
pub use types::*;
