//! Ticket request handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use ticketdesk_core::models::ticket::Ticket;
use ticketdesk_core::tickets::draft::TicketDraft;
use ticketdesk_core::tickets::patch::SparsePatch;

use crate::AppState;
use crate::error::AppResult;
use crate::models::{DeletedResponse, TicketCreatedResponse};
use crate::services::tickets;

/// `POST /tickets`: create a ticket and notify its assignee.
pub async fn create_ticket_handler(
    State(state): State<AppState>,
    body: Result<Json<TicketDraft>, JsonRejection>,
) -> AppResult<(StatusCode, Json<TicketCreatedResponse>)> {
    let Json(draft) = body?;
    let resp = tickets::create(&state, draft).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// `GET /tickets`: newest first.
pub async fn list_tickets_handler(State(state): State<AppState>) -> AppResult<Json<Vec<Ticket>>> {
    Ok(Json(state.tickets.list().await?))
}

/// `GET /tickets/{id}`
pub async fn get_ticket_handler(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<Ticket>> {
    let Path(id) = id?;
    Ok(Json(state.tickets.get(id).await?))
}

/// `PATCH /tickets/{id}`: sparse update of the present fields.
pub async fn update_ticket_handler(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<SparsePatch>, JsonRejection>,
) -> AppResult<Json<Ticket>> {
    let Path(id) = id?;
    let Json(patch) = body?;
    Ok(Json(tickets::update(&state, id, patch).await?))
}

/// `PATCH /tickets/{id}/pending`
pub async fn mark_pending_handler(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<Ticket>> {
    let Path(id) = id?;
    Ok(Json(tickets::mark_pending(&state, id).await?))
}

/// `PATCH /tickets/{id}/completed`
pub async fn mark_completed_handler(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<Ticket>> {
    let Path(id) = id?;
    Ok(Json(tickets::mark_completed(&state, id).await?))
}

/// `DELETE /tickets/{id}`: hard delete, no notification.
pub async fn delete_ticket_handler(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<DeletedResponse>> {
    let Path(id) = id?;
    state.tickets.delete(id).await?;
    Ok(Json(DeletedResponse { id }))
}
