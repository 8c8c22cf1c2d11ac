//! Staff directory handlers.

use axum::Json;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use ticketdesk_core::models::auth::Staff;

use crate::AppState;
use crate::error::{AppError, AppResult};

/// `GET /users`
pub async fn list_users_handler(State(state): State<AppState>) -> AppResult<Json<Vec<Staff>>> {
    Ok(Json(state.store.list_staff().await?))
}

/// `GET /users/{id}`
pub async fn get_user_handler(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<Staff>> {
    let Path(id) = id?;
    state
        .store
        .get_staff(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("staff user {id} not found")))
}
