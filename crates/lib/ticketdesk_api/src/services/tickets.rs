//! Ticket flows: engine call, then the assignee notification.

use ticketdesk_core::models::ticket::Ticket;
use ticketdesk_core::notify::{self, Notification, NotificationKind};
use ticketdesk_core::tickets::TicketSnapshot;
use ticketdesk_core::tickets::draft::TicketDraft;
use ticketdesk_core::tickets::patch::SparsePatch;

use crate::AppState;
use crate::error::AppResult;
use crate::models::TicketCreatedResponse;

/// Notify the assignee according to the configured policy.
///
/// Runs after the mutation committed, so an `Err` here does not undo it.
async fn notify_assignee(
    state: &AppState,
    kind: NotificationKind,
    snapshot: TicketSnapshot,
) -> AppResult<()> {
    notify::dispatch(
        state.notifier.clone(),
        state.config.notify_policy,
        Notification::new(kind, snapshot),
    )
    .await?;
    Ok(())
}

pub async fn create(state: &AppState, draft: TicketDraft) -> AppResult<TicketCreatedResponse> {
    let snapshot = state.tickets.create(draft.validate()?).await?;
    let ticket_id = snapshot.ticket.id;
    notify_assignee(state, NotificationKind::Created, snapshot).await?;
    Ok(TicketCreatedResponse {
        message: "Ticket registered successfully".into(),
        ticket_id,
    })
}

pub async fn update(state: &AppState, id: i32, patch: SparsePatch) -> AppResult<Ticket> {
    let patch = patch.into_patch()?;
    let snapshot = state.tickets.update(id, &patch).await?;
    let ticket = snapshot.ticket.clone();
    notify_assignee(state, NotificationKind::Updated, snapshot).await?;
    Ok(ticket)
}

pub async fn mark_pending(state: &AppState, id: i32) -> AppResult<Ticket> {
    let snapshot = state.tickets.mark_pending(id).await?;
    let ticket = snapshot.ticket.clone();
    notify_assignee(state, NotificationKind::Pending, snapshot).await?;
    Ok(ticket)
}

pub async fn mark_completed(state: &AppState, id: i32) -> AppResult<Ticket> {
    let snapshot = state.tickets.mark_completed(id).await?;
    let ticket = snapshot.ticket.clone();
    notify_assignee(state, NotificationKind::Completed, snapshot).await?;
    Ok(ticket)
}
