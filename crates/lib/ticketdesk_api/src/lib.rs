//! # ticketdesk_api
//!
//! HTTP API library for Ticketdesk.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::http::Method;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::routing::{get, patch, post};
use sqlx::PgPool;
use ticketdesk_core::auth::jwt::TokenService;
use ticketdesk_core::clock::{Clock, SystemClock};
use ticketdesk_core::notify::Notifier;
use ticketdesk_core::store::Store;
use ticketdesk_core::tickets::TicketEngine;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{auth, tickets, users};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub tickets: TicketEngine,
    pub notifier: Arc<dyn Notifier>,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>, config: ApiConfig) -> Self {
        Self::with_clock(store, notifier, config, Arc::new(SystemClock))
    }

    /// Build state whose tokens and ticket timestamps read `clock`.
    pub fn with_clock(
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
        config: ApiConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tokens =
            TokenService::with_clock(config.jwt_secret.as_bytes(), config.token_ttl, clock.clone());
        let tickets = TicketEngine::new(store.clone(), clock, config.ticket_zone);
        Self {
            store,
            tokens,
            tickets,
            notifier,
            config,
        }
    }
}

/// Run embedded database migrations.
///
/// Delegates to `ticketdesk_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    ticketdesk_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::GET, Method::PATCH, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::POST_REGISTER, post(auth::register_handler))
        .route(routes::POST_LOGIN, post(auth::login_handler))
        .route(routes::POST_REFRESH_TOKEN, post(auth::refresh_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route(routes::POST_LOGOUT, post(auth::logout_handler))
        .route(routes::GET_PROFILE, get(auth::profile_handler))
        .route(
            routes::TICKETS,
            post(tickets::create_ticket_handler).get(tickets::list_tickets_handler),
        )
        .route(
            routes::TICKETS_ID,
            get(tickets::get_ticket_handler)
                .patch(tickets::update_ticket_handler)
                .delete(tickets::delete_ticket_handler),
        )
        .route(
            routes::PATCH_TICKETS_ID_PENDING,
            patch(tickets::mark_pending_handler),
        )
        .route(
            routes::PATCH_TICKETS_ID_COMPLETED,
            patch(tickets::mark_completed_handler),
        )
        .route(routes::GET_USERS, get(users::list_users_handler))
        .route(routes::GET_USERS_ID, get(users::get_user_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .nest(routes::API_PREFIX, public.merge(protected))
        .layer(TimeoutLayer::new(state.config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
