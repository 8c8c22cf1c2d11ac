//! SMTP delivery.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use super::{Notification, Notifier, NotifyError};

pub const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP connection settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    /// STARTTLS port.
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: Option<String>,
}

impl SmtpConfig {
    /// Read settings from the environment.
    ///
    /// `SMTP_HOST`, `SMTP_USERNAME`, `SMTP_PASSWORD` and `SMTP_FROM_EMAIL` are
    /// required; `None` if any is missing or empty. `SMTP_PORT` defaults to
    /// 587, `SMTP_FROM_NAME` is optional.
    pub fn from_env() -> Option<Self> {
        fn get_env(key: &str) -> Option<String> {
            std::env::var(key).ok().filter(|s| !s.is_empty())
        }

        Some(Self {
            host: get_env("SMTP_HOST")?,
            port: get_env("SMTP_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            username: get_env("SMTP_USERNAME")?,
            password: get_env("SMTP_PASSWORD")?,
            from_email: get_env("SMTP_FROM_EMAIL")?,
            from_name: get_env("SMTP_FROM_NAME"),
        })
    }
}

/// Sends ticket notifications as HTML email.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    dashboard_url: String,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig, dashboard_url: impl Into<String>) -> Result<Self, NotifyError> {
        let from_addr: Address = config
            .from_email
            .parse()
            .map_err(|e| NotifyError::Address(format!("{}: {e}", config.from_email)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| NotifyError::Transport(format!("SMTP relay {}: {e}", config.host)))?
            .port(config.port)
            .credentials(Credentials::new(config.username, config.password))
            .build();

        info!(host = %config.host, port = config.port, "SMTP notifier configured");

        Ok(Self {
            transport,
            from: Mailbox::new(config.from_name, from_addr),
            dashboard_url: dashboard_url.into(),
        })
    }

    fn build(&self, notification: &Notification) -> Result<Message, NotifyError> {
        let to: Mailbox = notification
            .recipient
            .parse()
            .map_err(|e| NotifyError::Address(format!("{}: {e}", notification.recipient)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(notification.subject())
            .header(ContentType::TEXT_HTML)
            .body(notification.html_body(&self.dashboard_url))
            .map_err(|e| NotifyError::Build(e.to_string()))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let message = self.build(notification)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        info!(
            ticket_id = notification.ticket.id,
            recipient = %notification.recipient,
            "notification sent"
        );
        Ok(())
    }
}
