//! In-process store.
//!
//! Keeps the same uniqueness and foreign-key rules as the PostgreSQL schema
//! so the engine behaves identically on top of it. Used by tests and the
//! `--memory` server mode.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::RwLock;

use super::{Store, StoreError, StoreResult};
use crate::models::auth::{NewStaff, Staff, StaffWithPassword};
use crate::models::ticket::{NewTicket, TaskStatus, Ticket};
use crate::tickets::patch::TicketPatch;

#[derive(Debug, Default)]
pub struct MemoryStore {
    staff: RwLock<BTreeMap<i32, StaffWithPassword>>,
    tickets: RwLock<BTreeMap<i32, Ticket>>,
    next_staff_id: AtomicI32,
    next_ticket_id: AtomicI32,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with [`StoreError::Unavailable`] until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store is offline".into()))
        } else {
            Ok(())
        }
    }
}

fn next_id(counter: &AtomicI32) -> i32 {
    counter.fetch_add(1, Ordering::SeqCst) + 1
}

#[async_trait]
impl Store for MemoryStore {
    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        self.check_online()?;
        let staff = self.staff.read().await;
        Ok(staff.values().any(|s| s.staff.email == email))
    }

    async fn create_staff(&self, new: &NewStaff) -> StoreResult<i32> {
        self.check_online()?;
        let mut staff = self.staff.write().await;
        if staff.values().any(|s| s.staff.email == new.email) {
            return Err(StoreError::Conflict(format!(
                "staff_user email {} already exists",
                new.email
            )));
        }
        let id = next_id(&self.next_staff_id);
        staff.insert(
            id,
            StaffWithPassword {
                staff: Staff {
                    id,
                    first_name: new.first_name.clone(),
                    last_name: new.last_name.clone(),
                    email: new.email.clone(),
                },
                password_hash: new.password_hash.clone(),
            },
        );
        Ok(id)
    }

    async fn find_staff_by_email(&self, email: &str) -> StoreResult<Option<StaffWithPassword>> {
        self.check_online()?;
        let staff = self.staff.read().await;
        Ok(staff.values().find(|s| s.staff.email == email).cloned())
    }

    async fn get_staff(&self, id: i32) -> StoreResult<Option<Staff>> {
        self.check_online()?;
        let staff = self.staff.read().await;
        Ok(staff.get(&id).map(|s| s.staff.clone()))
    }

    async fn list_staff(&self) -> StoreResult<Vec<Staff>> {
        self.check_online()?;
        let staff = self.staff.read().await;
        Ok(staff.values().map(|s| s.staff.clone()).collect())
    }

    async fn insert_ticket(
        &self,
        ticket: &NewTicket,
        created_date: NaiveDateTime,
    ) -> StoreResult<i32> {
        self.check_online()?;
        if !self.staff.read().await.contains_key(&ticket.assigned_to) {
            return Err(assignee_violation(ticket.assigned_to));
        }
        let id = next_id(&self.next_ticket_id);
        self.tickets
            .write()
            .await
            .insert(id, ticket.clone().into_ticket(id, created_date));
        Ok(id)
    }

    async fn ticket_exists(&self, id: i32) -> StoreResult<bool> {
        self.check_online()?;
        Ok(self.tickets.read().await.contains_key(&id))
    }

    async fn get_ticket(&self, id: i32) -> StoreResult<Option<Ticket>> {
        self.check_online()?;
        Ok(self.tickets.read().await.get(&id).cloned())
    }

    async fn list_tickets(&self) -> StoreResult<Vec<Ticket>> {
        self.check_online()?;
        let mut rows: Vec<Ticket> = self.tickets.read().await.values().cloned().collect();
        rows.sort_by(|a, b| b.created_date.cmp(&a.created_date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn update_ticket(&self, id: i32, patch: &TicketPatch) -> StoreResult<u64> {
        self.check_online()?;
        if patch.is_empty() {
            return Ok(0);
        }
        if let Some(staff_id) = patch.assigned_to
            && !self.staff.read().await.contains_key(&staff_id)
        {
            return Err(assignee_violation(staff_id));
        }
        let mut tickets = self.tickets.write().await;
        match tickets.get_mut(&id) {
            Some(ticket) => {
                patch.apply_to(ticket);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn set_ticket_status(&self, id: i32, status: TaskStatus) -> StoreResult<Option<Ticket>> {
        self.check_online()?;
        let mut tickets = self.tickets.write().await;
        Ok(tickets.get_mut(&id).map(|ticket| {
            ticket.task_status = status;
            ticket.clone()
        }))
    }

    async fn delete_ticket(&self, id: i32) -> StoreResult<u64> {
        self.check_online()?;
        Ok(u64::from(self.tickets.write().await.remove(&id).is_some()))
    }
}

fn assignee_violation(staff_id: i32) -> StoreError {
    StoreError::Constraint(format!("assigned_to {staff_id} is not a staff_user"))
}
