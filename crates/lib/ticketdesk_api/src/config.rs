//! API server configuration.

use std::str::FromStr;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use ticketdesk_core::auth::jwt::{TokenTtl, resolve_jwt_secret};
use ticketdesk_core::notify::NotifyPolicy;
use tracing::warn;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5431";
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/ticketing_db";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
/// UTC+09:00.
pub const DEFAULT_TICKET_UTC_OFFSET_SECS: i32 = 9 * 60 * 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_DASHBOARD_URL: &str = "http://localhost:9000/dashboard";

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "0.0.0.0:5431").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    pub db_max_connections: u32,
    /// JWT signing secret.
    pub jwt_secret: String,
    pub token_ttl: TokenTtl,
    /// Fixed zone whose wall-clock time stamps new tickets.
    pub ticket_zone: FixedOffset,
    pub request_timeout: Duration,
    pub notify_policy: NotifyPolicy,
    /// Link placed in notification emails.
    pub dashboard_url: String,
}

impl ApiConfig {
    /// Defaults for everything except the signing secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.into(),
            database_url: DEFAULT_DATABASE_URL.into(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            jwt_secret: jwt_secret.into(),
            token_ttl: TokenTtl::default(),
            ticket_zone: default_zone(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            notify_policy: NotifyPolicy::default(),
            dashboard_url: DEFAULT_DASHBOARD_URL.into(),
        }
    }

    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                  | Default                                   |
    /// |---------------------------|-------------------------------------------|
    /// | `BIND_ADDR`               | `0.0.0.0:5431`                            |
    /// | `DATABASE_URL`            | `postgres://localhost:5432/ticketing_db`  |
    /// | `DB_MAX_CONNECTIONS`      | `5`                                       |
    /// | `JWT_SECRET` / `AUTH_SECRET` | generated & persisted to file          |
    /// | `ACCESS_TOKEN_TTL_SECS`   | `900`                                     |
    /// | `REFRESH_TOKEN_TTL_SECS`  | `86400`                                   |
    /// | `TICKET_UTC_OFFSET_SECS`  | `32400`                                   |
    /// | `REQUEST_TIMEOUT_SECS`    | `15`                                      |
    /// | `NOTIFY_POLICY`           | `blocking`                                |
    /// | `DASHBOARD_URL`           | `http://localhost:9000/dashboard`         |
    ///
    /// Unparseable values are logged and replaced by the default.
    pub fn from_env() -> Self {
        let mut config = Self::new(resolve_jwt_secret());
        let defaults = TokenTtl::default();

        if let Ok(addr) = std::env::var("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }
        config.db_max_connections = env_or("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS);
        config.token_ttl = TokenTtl {
            access: ttl_from_secs(
                "ACCESS_TOKEN_TTL_SECS",
                env_or("ACCESS_TOKEN_TTL_SECS", defaults.access.num_seconds()),
                defaults.access,
            ),
            refresh: ttl_from_secs(
                "REFRESH_TOKEN_TTL_SECS",
                env_or("REFRESH_TOKEN_TTL_SECS", defaults.refresh.num_seconds()),
                defaults.refresh,
            ),
        };
        config.ticket_zone = zone_from_secs(env_or(
            "TICKET_UTC_OFFSET_SECS",
            DEFAULT_TICKET_UTC_OFFSET_SECS,
        ));
        config.request_timeout =
            Duration::from_secs(env_or("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS));
        config.notify_policy = env_or("NOTIFY_POLICY", NotifyPolicy::default());
        if let Ok(url) = std::env::var("DASHBOARD_URL") {
            config.dashboard_url = url;
        }
        config
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "unparseable config value, using default");
            default
        }),
        Err(_) => default,
    }
}

fn default_zone() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_TICKET_UTC_OFFSET_SECS).unwrap_or(Utc.fix())
}

/// Token lifetime from seconds; non-positive or unrepresentable values fall back to `default`.
pub fn ttl_from_secs(key: &str, secs: i64, default: chrono::Duration) -> chrono::Duration {
    let ttl = chrono::Duration::try_seconds(secs)
        .filter(|ttl| secs > 0 && Utc::now().checked_add_signed(*ttl).is_some());
    match ttl {
        Some(ttl) => ttl,
        _ => {
            warn!(key, secs, "token lifetime must be a positive number of seconds, using default");
            default
        }
    }
}

/// Fixed offset from seconds east of UTC; out-of-range values fall back to the default.
pub fn zone_from_secs(secs: i32) -> FixedOffset {
    FixedOffset::east_opt(secs).unwrap_or_else(|| {
        warn!(secs, "ticket UTC offset out of range, using default");
        default_zone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ApiConfig::new("s");
        assert_eq!(config.bind_addr, "0.0.0.0:5431");
        assert_eq!(config.token_ttl.access.num_seconds(), 900);
        assert_eq!(config.token_ttl.refresh.num_seconds(), 86_400);
        assert_eq!(config.ticket_zone.local_minus_utc(), 32_400);
        assert_eq!(config.notify_policy, NotifyPolicy::Blocking);
    }

    #[test]
    fn out_of_range_offset_falls_back() {
        assert_eq!(zone_from_secs(3600).local_minus_utc(), 3600);
        assert_eq!(zone_from_secs(200_000).local_minus_utc(), 32_400);
    }

    #[test]
    fn token_lifetimes_must_be_positive_and_representable() {
        let fallback = chrono::Duration::seconds(900);
        assert_eq!(ttl_from_secs("T", 60, fallback).num_seconds(), 60);
        assert_eq!(ttl_from_secs("T", 0, fallback), fallback);
        assert_eq!(ttl_from_secs("T", -5, fallback), fallback);
        assert_eq!(ttl_from_secs("T", i64::MAX, fallback), fallback);
        assert_eq!(ttl_from_secs("T", i64::MAX / 1000, fallback), fallback);
    }
}
