//! PostgreSQL-backed store.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;

use super::{Store, StoreResult};
use crate::auth::queries as staff;
use crate::models::auth::{NewStaff, Staff, StaffWithPassword};
use crate::models::ticket::{NewTicket, TaskStatus, Ticket};
use crate::tickets::patch::TicketPatch;
use crate::tickets::queries as tickets;

/// [`Store`] over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        staff::email_exists(&self.pool, email).await
    }

    async fn create_staff(&self, new: &NewStaff) -> StoreResult<i32> {
        staff::create_staff(&self.pool, new).await
    }

    async fn find_staff_by_email(&self, email: &str) -> StoreResult<Option<StaffWithPassword>> {
        staff::find_staff_by_email(&self.pool, email).await
    }

    async fn get_staff(&self, id: i32) -> StoreResult<Option<Staff>> {
        staff::get_staff(&self.pool, id).await
    }

    async fn list_staff(&self) -> StoreResult<Vec<Staff>> {
        staff::list_staff(&self.pool).await
    }

    async fn insert_ticket(
        &self,
        ticket: &NewTicket,
        created_date: NaiveDateTime,
    ) -> StoreResult<i32> {
        tickets::insert_ticket(&self.pool, ticket, created_date).await
    }

    async fn ticket_exists(&self, id: i32) -> StoreResult<bool> {
        tickets::ticket_exists(&self.pool, id).await
    }

    async fn get_ticket(&self, id: i32) -> StoreResult<Option<Ticket>> {
        tickets::get_ticket(&self.pool, id).await
    }

    async fn list_tickets(&self) -> StoreResult<Vec<Ticket>> {
        tickets::list_tickets(&self.pool).await
    }

    async fn update_ticket(&self, id: i32, patch: &TicketPatch) -> StoreResult<u64> {
        tickets::update_ticket(&self.pool, id, patch).await
    }

    async fn set_ticket_status(&self, id: i32, status: TaskStatus) -> StoreResult<Option<Ticket>> {
        tickets::set_ticket_status(&self.pool, id, status).await
    }

    async fn delete_ticket(&self, id: i32) -> StoreResult<u64> {
        tickets::delete_ticket(&self.pool, id).await
    }
}
