//! # ticketdesk_core
//!
//! Core domain logic for Ticketdesk: credential hashing, stateless tokens,
//! the request auth gate, and the ticket update engine.

pub mod auth;
pub mod clock;
pub mod migrate;
pub mod models;
pub mod notify;
pub mod store;
pub mod tickets;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
