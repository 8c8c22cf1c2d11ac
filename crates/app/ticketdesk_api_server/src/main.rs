//! Ticketdesk API server binary.
//!
//! Reads configuration from the environment (and `.env`), with CLI flags
//! taking precedence, then serves the REST API until interrupted.

use std::sync::Arc;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use ticketdesk_api::config::ApiConfig;
use ticketdesk_core::notify::{LogNotifier, Notifier, NotifyPolicy, SmtpConfig, SmtpNotifier};
use ticketdesk_core::store::{MemoryStore, PgStore, Store};
use tracing::{info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "ticketdesk_api_server", about = "Ticketdesk API server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR")]
    bind_addr: Option<String>,

    /// PostgreSQL connection URL.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, env = "DB_MAX_CONNECTIONS")]
    max_connections: Option<u32>,

    /// Wait for notification delivery (`blocking`) or send it in the background.
    #[arg(long, env = "NOTIFY_POLICY")]
    notify_policy: Option<NotifyPolicy>,

    /// Keep all data in memory instead of PostgreSQL. Nothing survives a restart.
    #[arg(long, default_value_t = false)]
    memory: bool,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| {
                    tracing_subscriber::EnvFilter::try_new(
                        "info,ticketdesk_api=debug,ticketdesk_core=debug",
                    )
                })?,
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    if let Some(addr) = args.bind_addr {
        config.bind_addr = addr;
    }
    if let Some(url) = args.database_url {
        config.database_url = url;
    }
    if let Some(n) = args.max_connections {
        config.db_max_connections = n;
    }
    if let Some(policy) = args.notify_policy {
        config.notify_policy = policy;
    }

    info!(
        bind_addr = %config.bind_addr,
        memory = args.memory,
        notify_policy = ?config.notify_policy,
        "starting ticketdesk_api_server"
    );

    let store: Arc<dyn Store> = if args.memory {
        warn!("using in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        info!(
            max_connections = config.db_max_connections,
            "configuring connection pool"
        );
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(&config.database_url)
            .await?;

        info!("running database migrations");
        ticketdesk_api::migrate(&pool).await?;
        Arc::new(PgStore::new(pool))
    };

    let notifier: Arc<dyn Notifier> = match SmtpConfig::from_env() {
        Some(smtp) => Arc::new(SmtpNotifier::new(smtp, config.dashboard_url.clone())?),
        None => {
            warn!("SMTP not configured; notifications will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let bind_addr = config.bind_addr.clone();
    let state = ticketdesk_api::AppState::new(store, notifier, config);
    let app = ticketdesk_api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
