//! Ticket update engine.
//!
//! Creation, sparse partial updates, fixed status transitions and deletion,
//! all going through the [`Store`] seam. Every mutation that a notification
//! follows returns a [`TicketSnapshot`] re-read after the write.

pub mod draft;
pub mod patch;
pub mod queries;

use std::sync::Arc;

use chrono::{FixedOffset, SubsecRound};
use thiserror::Error;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::models::auth::Staff;
use crate::models::ticket::{NewTicket, TaskStatus, Ticket};
use crate::store::{Store, StoreError};
use patch::TicketPatch;

/// Ticket engine errors.
#[derive(Debug, Error)]
pub enum TicketError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No data to update for ticket")]
    NoFieldsToUpdate,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// A ticket as it stands after a write, plus the assignee's contact data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketSnapshot {
    pub ticket: Ticket,
    pub assignee: Staff,
}

/// Applies ticket operations against a store.
#[derive(Clone)]
pub struct TicketEngine {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    zone: FixedOffset,
}

impl TicketEngine {
    /// `zone` is the fixed offset whose wall-clock time stamps `created_date`.
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, zone: FixedOffset) -> Self {
        Self { store, clock, zone }
    }

    /// Create a ticket assigned to an existing staff member.
    ///
    /// The assignee is resolved before anything is written, so an unknown
    /// assignee leaves no row behind.
    pub async fn create(&self, ticket: NewTicket) -> Result<TicketSnapshot, TicketError> {
        let assignee = self.assignee(ticket.assigned_to).await?;
        let created_date = self.clock.local_now(self.zone).trunc_subsecs(0);

        let id = self.store.insert_ticket(&ticket, created_date).await?;
        info!(ticket_id = id, assigned_to = assignee.id, "ticket created");

        Ok(TicketSnapshot {
            ticket: ticket.into_ticket(id, created_date),
            assignee,
        })
    }

    pub async fn get(&self, id: i32) -> Result<Ticket, TicketError> {
        self.store
            .get_ticket(id)
            .await?
            .ok_or_else(|| ticket_not_found(id))
    }

    /// All tickets, newest first.
    pub async fn list(&self) -> Result<Vec<Ticket>, TicketError> {
        Ok(self.store.list_tickets().await?)
    }

    /// Apply a sparse patch. Only present fields are written, in one statement.
    pub async fn update(&self, id: i32, patch: &TicketPatch) -> Result<TicketSnapshot, TicketError> {
        self.ensure_exists(id).await?;

        if patch.is_empty() {
            return Err(TicketError::NoFieldsToUpdate);
        }
        if let Some(staff_id) = patch.assigned_to {
            self.assignee(staff_id).await?;
        }

        let affected = self.store.update_ticket(id, patch).await?;
        if affected == 0 {
            return Err(ticket_not_found(id));
        }
        debug!(
            ticket_id = id,
            fields = patch.assignments().len(),
            "ticket patched"
        );

        let ticket = self.get(id).await?;
        let assignee = self.assignee(ticket.assigned_to).await?;
        Ok(TicketSnapshot { ticket, assignee })
    }

    /// Set the status to `Pending`, whatever it was before.
    pub async fn mark_pending(&self, id: i32) -> Result<TicketSnapshot, TicketError> {
        self.transition(id, TaskStatus::Pending).await
    }

    /// Set the status to `Completed`, whatever it was before.
    pub async fn mark_completed(&self, id: i32) -> Result<TicketSnapshot, TicketError> {
        self.transition(id, TaskStatus::Completed).await
    }

    /// Hard delete.
    pub async fn delete(&self, id: i32) -> Result<(), TicketError> {
        if self.store.delete_ticket(id).await? == 0 {
            return Err(ticket_not_found(id));
        }
        info!(ticket_id = id, "ticket deleted");
        Ok(())
    }

    async fn transition(&self, id: i32, status: TaskStatus) -> Result<TicketSnapshot, TicketError> {
        self.ensure_exists(id).await?;

        let ticket = self
            .store
            .set_ticket_status(id, status)
            .await?
            .ok_or_else(|| ticket_not_found(id))?;
        info!(ticket_id = id, status = %status, "ticket status changed");

        let assignee = self.assignee(ticket.assigned_to).await?;
        Ok(TicketSnapshot { ticket, assignee })
    }

    async fn ensure_exists(&self, id: i32) -> Result<(), TicketError> {
        if self.store.ticket_exists(id).await? {
            Ok(())
        } else {
            Err(ticket_not_found(id))
        }
    }

    async fn assignee(&self, staff_id: i32) -> Result<Staff, TicketError> {
        self.store
            .get_staff(staff_id)
            .await?
            .ok_or_else(|| TicketError::NotFound(format!("staff user {staff_id}")))
    }
}

fn ticket_not_found(id: i32) -> TicketError {
    TicketError::NotFound(format!("ticket {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::auth::NewStaff;
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};

    struct Fixture {
        store: Arc<MemoryStore>,
        engine: TicketEngine,
        staff_id: i32,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let staff_id = store
            .create_staff(&NewStaff {
                first_name: "Yuki".into(),
                last_name: "Tanaka".into(),
                email: "yuki@example.com".into(),
                password_hash: "x".into(),
            })
            .await
            .unwrap();
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 1, 10, 23, 30, 0).unwrap(),
        ));
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let engine = TicketEngine::new(store.clone(), clock, tokyo);
        Fixture {
            store,
            engine,
            staff_id,
        }
    }

    fn new_ticket(assigned_to: i32) -> NewTicket {
        NewTicket {
            reported_by: "guest".into(),
            accommodation_name: "Snow Lodge".into(),
            accommodation_room_number: 12,
            accommodation_specific_location: "kitchen".into(),
            accommodation_type: "chalet".into(),
            request_type: "repair".into(),
            request_detail: "heater broken".into(),
            task_priority: "High".into(),
            assigned_to,
            note: "call first".into(),
            image: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn create_forces_initial_state() {
        let f = fixture().await;
        let snap = f.engine.create(new_ticket(f.staff_id)).await.unwrap();

        assert_eq!(snap.ticket.task_status, TaskStatus::Assigned);
        assert_eq!(snap.ticket.alert_level, 0);
        assert_eq!(snap.ticket.completion_date, None);
        assert_eq!(snap.ticket.created_date.to_string(), "2024-01-11 08:30:00");
        assert_eq!(snap.assignee.email, "yuki@example.com");
        assert_eq!(f.engine.get(snap.ticket.id).await.unwrap(), snap.ticket);
    }

    #[tokio::test]
    async fn create_with_unknown_assignee_leaves_nothing() {
        let f = fixture().await;
        let err = f.engine.create(new_ticket(7)).await.unwrap_err();
        assert!(matches!(err, TicketError::NotFound(_)));
        assert!(f.engine.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_patch_is_no_op_error() {
        let f = fixture().await;
        let id = f.engine.create(new_ticket(f.staff_id)).await.unwrap().ticket.id;
        let err = f.engine.update(id, &TicketPatch::default()).await.unwrap_err();
        assert!(matches!(err, TicketError::NoFieldsToUpdate));
    }

    #[tokio::test]
    async fn single_field_patch_touches_only_that_field() {
        let f = fixture().await;
        let before = f.engine.create(new_ticket(f.staff_id)).await.unwrap().ticket;

        let patch = TicketPatch {
            request_detail: Some("heater fixed, check again".into()),
            ..TicketPatch::default()
        };
        let after = f.engine.update(before.id, &patch).await.unwrap().ticket;

        let mut expected = before.clone();
        expected.request_detail = "heater fixed, check again".into();
        assert_eq!(after, expected);
    }

    #[tokio::test]
    async fn injection_payload_is_stored_literally() {
        let f = fixture().await;
        let before = f.engine.create(new_ticket(f.staff_id)).await.unwrap().ticket;
        let payload = "x'); DROP TABLE ticket;--";

        let patch = TicketPatch {
            note: Some(payload.into()),
            ..TicketPatch::default()
        };
        let after = f.engine.update(before.id, &patch).await.unwrap().ticket;

        assert_eq!(after.note, payload);
        assert_eq!(
            Ticket {
                note: before.note.clone(),
                ..after
            },
            before
        );
        assert_eq!(f.engine.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_missing_ticket_is_not_found() {
        let f = fixture().await;
        let patch = TicketPatch {
            note: Some("n".into()),
            ..TicketPatch::default()
        };
        assert!(matches!(
            f.engine.update(99, &patch).await,
            Err(TicketError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn reassigning_to_unknown_staff_writes_nothing() {
        let f = fixture().await;
        let before = f.engine.create(new_ticket(f.staff_id)).await.unwrap().ticket;
        let patch = TicketPatch {
            assigned_to: Some(404),
            note: Some("moved".into()),
            ..TicketPatch::default()
        };
        assert!(matches!(
            f.engine.update(before.id, &patch).await,
            Err(TicketError::NotFound(_))
        ));
        assert_eq!(f.engine.get(before.id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn status_transitions_are_unconditional() {
        let f = fixture().await;
        let id = f.engine.create(new_ticket(f.staff_id)).await.unwrap().ticket.id;

        let done = f.engine.mark_completed(id).await.unwrap();
        assert_eq!(done.ticket.task_status, TaskStatus::Completed);

        let back = f.engine.mark_pending(id).await.unwrap();
        assert_eq!(back.ticket.task_status, TaskStatus::Pending);
        assert_eq!(
            f.engine.get(id).await.unwrap().task_status,
            TaskStatus::Pending
        );
    }

    #[tokio::test]
    async fn transition_on_missing_ticket_is_not_found() {
        let f = fixture().await;
        assert!(matches!(
            f.engine.mark_pending(5).await,
            Err(TicketError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_is_hard_and_reports_missing() {
        let f = fixture().await;
        let id = f.engine.create(new_ticket(f.staff_id)).await.unwrap().ticket.id;

        f.engine.delete(id).await.unwrap();
        assert!(!f.store.ticket_exists(id).await.unwrap());
        assert!(matches!(
            f.engine.delete(id).await,
            Err(TicketError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn storage_failure_surfaces_as_store_error() {
        let f = fixture().await;
        f.store.set_offline(true);
        assert!(matches!(
            f.engine.create(new_ticket(f.staff_id)).await,
            Err(TicketError::Store(_))
        ));
    }
}
