//! Storage seam for staff accounts and tickets.
//!
//! [`Store`] is the only way the engine reaches persistent state. Every
//! value travels as a bound parameter; no implementation may splice
//! caller-supplied text into a statement.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::auth::{NewStaff, Staff, StaffWithPassword};
use crate::models::ticket::{NewTicket, TaskStatus, Ticket};
use crate::tickets::patch::TicketPatch;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Backing store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate value: {0}")]
    Conflict(String),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("Database error: {0}")]
    Db(sqlx::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return StoreError::Conflict(db.message().to_string());
            }
            if db.is_foreign_key_violation() || db.is_check_violation() {
                return StoreError::Constraint(db.message().to_string());
            }
        }
        StoreError::Db(e)
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistent state for staff accounts and tickets.
#[async_trait]
pub trait Store: Send + Sync {
    // -- staff -------------------------------------------------------------

    /// Check whether an email is already registered.
    async fn email_exists(&self, email: &str) -> StoreResult<bool>;

    /// Insert a staff account in its own transaction, returning the new ID.
    async fn create_staff(&self, staff: &NewStaff) -> StoreResult<i32>;

    async fn find_staff_by_email(&self, email: &str) -> StoreResult<Option<StaffWithPassword>>;

    async fn get_staff(&self, id: i32) -> StoreResult<Option<Staff>>;

    async fn list_staff(&self) -> StoreResult<Vec<Staff>>;

    // -- tickets -----------------------------------------------------------

    /// Insert a ticket in its own transaction, returning the new ID.
    ///
    /// The row is stored with [`TaskStatus::INITIAL`], alert level 0 and the
    /// given creation date.
    async fn insert_ticket(
        &self,
        ticket: &NewTicket,
        created_date: NaiveDateTime,
    ) -> StoreResult<i32>;

    async fn ticket_exists(&self, id: i32) -> StoreResult<bool>;

    async fn get_ticket(&self, id: i32) -> StoreResult<Option<Ticket>>;

    /// All tickets, newest first.
    async fn list_tickets(&self) -> StoreResult<Vec<Ticket>>;

    /// Apply the present fields of `patch` in one statement. Returns rows affected.
    async fn update_ticket(&self, id: i32, patch: &TicketPatch) -> StoreResult<u64>;

    /// Overwrite the status in its own transaction, returning the updated row.
    async fn set_ticket_status(&self, id: i32, status: TaskStatus) -> StoreResult<Option<Ticket>>;

    /// Hard delete. Returns rows affected.
    async fn delete_ticket(&self, id: i32) -> StoreResult<u64>;
}
