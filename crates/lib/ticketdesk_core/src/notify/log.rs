//! Logging-only notifier for development and deployments without SMTP.

use async_trait::async_trait;
use tracing::info;

use super::{Notification, Notifier, NotifyError};

#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            ticket_id = notification.ticket.id,
            recipient = %notification.recipient,
            subject = %notification.subject(),
            "notification (not sent, SMTP not configured)"
        );
        Ok(())
    }
}
