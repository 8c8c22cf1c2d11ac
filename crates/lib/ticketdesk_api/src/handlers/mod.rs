//! Request handlers.

pub mod auth;
pub mod tickets;
pub mod users;
