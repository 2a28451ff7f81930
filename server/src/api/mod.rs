//! JSON API handlers.
//!
//! Request/response DTOs live next to their handlers; the wire shapes stay
//! decoupled from the domain types so the storage model can evolve without
//! breaking clients.

pub mod events;
pub mod payments;
pub mod registrations;
