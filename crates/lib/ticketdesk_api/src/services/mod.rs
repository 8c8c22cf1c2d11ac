//! Request-independent flows shared by the handlers.

pub mod auth;
pub mod tickets;
