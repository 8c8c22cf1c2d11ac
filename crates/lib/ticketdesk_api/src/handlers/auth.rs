//! Staff authentication request handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use ticketdesk_core::auth::registration::Registration;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    LoginRequest, LogoutResponse, ProfileResponse, RefreshRequest, RegisterResponse,
    TokenResponse,
};
use crate::services::auth;

/// `POST /register`: create a staff account.
pub async fn register_handler(
    State(state): State<AppState>,
    body: Result<Json<Registration>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(body) = body?;
    let resp = auth::register(state.store.as_ref(), body).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// `POST /login`: authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<TokenResponse>> {
    let Json(body) = body?;
    let resp = auth::login(
        state.store.as_ref(),
        &state.tokens,
        &body.email,
        &body.password,
    )
    .await?;
    Ok(Json(resp))
}

/// `POST /refresh-token`: exchange a refresh token for a new token pair.
pub async fn refresh_handler(
    State(state): State<AppState>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> AppResult<Json<TokenResponse>> {
    let Json(body) = body?;
    Ok(Json(auth::refresh(&state.tokens, &body.refresh_token)?))
}

/// `POST /logout`
pub async fn logout_handler(Extension(_user): Extension<AuthenticatedUser>) -> Json<LogoutResponse> {
    Json(auth::logout())
}

/// `GET /profile`: the caller's identity, straight from the token claims.
pub async fn profile_handler(
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<ProfileResponse> {
    let claims = user.0;
    Json(ProfileResponse {
        id: claims.user_id,
        first_name: claims.first_name,
        last_name: claims.last_name,
    })
}
