//! PostgreSQL registration store for the Clubdesk registration core.
//!
//! Implements the `RegistrationStore` seam from `clubdesk-core` on top of
//! PostgreSQL via sqlx. Every mutating operation is one transaction; the
//! event row is locked (`SELECT … FOR UPDATE`) before any capacity- or
//! waitlist-affecting write, which serializes admissions, cancellations and
//! promotions per event. Ledger operations lock the registration row, then
//! the payment row, in that fixed order.
//!
//! # Example
//!
//! ```ignore
//! use clubdesk_postgres::{PgRegistrationStore, PgStoreConfig};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PgRegistrationStore::connect(&PgStoreConfig {
//!         url: "postgres://localhost/clubdesk".to_string(),
//!         ..PgStoreConfig::default()
//!     })
//!     .await?;
//!     store.run_migrations().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod store;

pub use store::{PgRegistrationStore, PgStoreConfig};

/// Embedded migrations for the registration schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();
