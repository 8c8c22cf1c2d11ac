//! Ticket notifications.
//!
//! After a ticket is created, patched or moved to Pending/Completed, the
//! assignee receives an HTML email describing the ticket as stored.
//! Delivery goes through the [`Notifier`] seam; [`NotifyPolicy`] decides
//! whether the caller waits for it.

pub mod log;
pub mod smtp;

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::models::ticket::Ticket;
use crate::tickets::TicketSnapshot;

pub use log::LogNotifier;
pub use smtp::{SmtpConfig, SmtpNotifier};

/// Notification errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Delivery failed: {0}")]
    Transport(String),
}

/// Which mutation triggered the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Created,
    Updated,
    Pending,
    Completed,
}

impl NotificationKind {
    pub fn subject(self, ticket_id: i32) -> String {
        match self {
            NotificationKind::Created => format!("Ticket #{ticket_id} Has Been Assigned To You"),
            NotificationKind::Updated => format!("Ticket #{ticket_id} Updated"),
            NotificationKind::Pending => format!("Ticket #{ticket_id} Updated To Pending"),
            NotificationKind::Completed => format!("Ticket #{ticket_id} Updated To Completed"),
        }
    }

    fn headline(self) -> &'static str {
        match self {
            NotificationKind::Created => "A ticket has been assigned to you",
            NotificationKind::Updated => "A ticket has been updated",
            NotificationKind::Pending => "A ticket status has been updated to pending",
            NotificationKind::Completed => "A ticket status has been updated to completed",
        }
    }
}

/// One email to one assignee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    /// Assignee email address.
    pub recipient: String,
    pub assignee_name: String,
    pub ticket: Ticket,
}

impl Notification {
    pub fn new(kind: NotificationKind, snapshot: TicketSnapshot) -> Self {
        Self {
            kind,
            recipient: snapshot.assignee.email.clone(),
            assignee_name: snapshot.assignee.display_name(),
            ticket: snapshot.ticket,
        }
    }

    pub fn subject(&self) -> String {
        self.kind.subject(self.ticket.id)
    }

    /// Render the email body. Every ticket value is HTML-escaped.
    pub fn html_body(&self, dashboard_url: &str) -> String {
        let t = &self.ticket;
        let room = match t.accommodation_room_number {
            0 => String::new(),
            n => n.to_string(),
        };
        let rows = [
            ("Reported By", t.reported_by.as_str()),
            ("Assigned To", self.assignee_name.as_str()),
            ("Accommodation Name", t.accommodation_name.as_str()),
            ("Accommodation Room Number", room.as_str()),
            ("Specific Location", t.accommodation_specific_location.as_str()),
            ("Accommodation Type", t.accommodation_type.as_str()),
            ("Request Type", t.request_type.as_str()),
            ("Task Status", t.task_status.as_str()),
            ("Task Priority", t.task_priority.as_str()),
            ("Notes", t.note.as_str()),
        ];

        let mut html = String::from("<html>\n<body>\n");
        let _ = writeln!(
            html,
            "<h1 style=\"font-weight:700;\">{}</h1>",
            self.kind.headline()
        );
        html.push_str("<p>Please see ticket information or visit the link below.</p>\n");
        html.push_str("<ul style=\"list-style-type:none;\">\n");
        let _ = writeln!(
            html,
            "<li style=\"padding-bottom:5px;\"><h2 style=\"font-weight:700;\">#{} {}</h2></li>",
            t.id,
            escape_html(&t.request_detail)
        );
        for (label, value) in rows {
            let _ = writeln!(
                html,
                "<li style=\"padding-bottom:20px;\">{label}: {}</li>",
                escape_html(value)
            );
        }
        html.push_str("</ul>\n");
        let _ = writeln!(
            html,
            "<a href=\"{}\">Go To Ticketing Management System</a>",
            escape_html(dashboard_url)
        );
        html.push_str("</body>\n</html>\n");
        html
    }
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Delivers notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Whether a mutation waits for its notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifyPolicy {
    /// Wait for delivery; a failure is reported to the caller after the
    /// mutation has already committed.
    #[default]
    Blocking,
    /// Spawn delivery on the runtime; failures are only logged.
    Background,
}

impl std::str::FromStr for NotifyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blocking" => Ok(NotifyPolicy::Blocking),
            "background" => Ok(NotifyPolicy::Background),
            other => Err(format!(
                "invalid notify policy {other:?}: expected blocking or background"
            )),
        }
    }
}

/// Send `notification` under `policy`.
pub async fn dispatch(
    notifier: Arc<dyn Notifier>,
    policy: NotifyPolicy,
    notification: Notification,
) -> Result<(), NotifyError> {
    match policy {
        NotifyPolicy::Blocking => notifier.send(&notification).await,
        NotifyPolicy::Background => {
            tokio::spawn(async move {
                if let Err(e) = notifier.send(&notification).await {
                    warn!(
                        ticket_id = notification.ticket.id,
                        recipient = %notification.recipient,
                        error = %e,
                        "background notification failed"
                    );
                }
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Staff;
    use crate::models::ticket::NewTicket;
    use chrono::NaiveDateTime;
    use tokio::sync::Mutex;

    fn snapshot(room: i32, note: &str) -> TicketSnapshot {
        let created =
            NaiveDateTime::parse_from_str("2024-02-02 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let ticket = NewTicket {
            reported_by: "Guest <script>".into(),
            accommodation_name: "Pine & Co".into(),
            accommodation_room_number: room,
            accommodation_specific_location: "attic".into(),
            accommodation_type: "cabin".into(),
            request_type: "repair".into(),
            request_detail: "window".into(),
            task_priority: "Low".into(),
            assigned_to: 2,
            note: note.into(),
            image: Vec::new(),
        }
        .into_ticket(42, created);
        TicketSnapshot {
            ticket,
            assignee: Staff {
                id: 2,
                first_name: "Hana".into(),
                last_name: "Sato".into(),
                email: "hana@example.com".into(),
            },
        }
    }

    #[test]
    fn subjects_per_kind() {
        assert_eq!(
            NotificationKind::Created.subject(5),
            "Ticket #5 Has Been Assigned To You"
        );
        assert_eq!(NotificationKind::Updated.subject(5), "Ticket #5 Updated");
        assert_eq!(
            NotificationKind::Pending.subject(5),
            "Ticket #5 Updated To Pending"
        );
        assert_eq!(
            NotificationKind::Completed.subject(5),
            "Ticket #5 Updated To Completed"
        );
    }

    #[test]
    fn body_escapes_values() {
        let n = Notification::new(NotificationKind::Updated, snapshot(3, "a\"b"));
        let body = n.html_body("http://localhost:9000/dashboard");
        assert!(body.contains("Reported By: Guest &lt;script&gt;"));
        assert!(body.contains("Accommodation Name: Pine &amp; Co"));
        assert!(body.contains("Notes: a&quot;b"));
        assert!(body.contains("Assigned To: Hana Sato"));
        assert!(body.contains("#42 window"));
        assert!(!body.contains("<script>"));
    }

    #[test]
    fn zero_room_number_renders_empty() {
        let n = Notification::new(NotificationKind::Created, snapshot(0, ""));
        let body = n.html_body("http://x");
        assert!(body.contains("Accommodation Room Number: </li>"));
        assert_eq!(n.recipient, "hana@example.com");
    }

    #[test]
    fn policy_parses() {
        assert_eq!("Background".parse::<NotifyPolicy>(), Ok(NotifyPolicy::Background));
        assert_eq!("blocking".parse::<NotifyPolicy>(), Ok(NotifyPolicy::Blocking));
        assert!("later".parse::<NotifyPolicy>().is_err());
    }

    struct Failing;

    #[async_trait]
    impl Notifier for Failing {
        async fn send(&self, _: &Notification) -> Result<(), NotifyError> {
            Err(NotifyError::Transport("down".into()))
        }
    }

    #[derive(Default)]
    struct Recording(Mutex<Vec<String>>);

    #[async_trait]
    impl Notifier for Recording {
        async fn send(&self, n: &Notification) -> Result<(), NotifyError> {
            self.0.lock().await.push(n.subject());
            Ok(())
        }
    }

    #[tokio::test]
    async fn blocking_surfaces_failure() {
        let n = Notification::new(NotificationKind::Pending, snapshot(1, ""));
        let result = dispatch(Arc::new(Failing), NotifyPolicy::Blocking, n).await;
        assert!(matches!(result, Err(NotifyError::Transport(_))));
    }

    #[tokio::test]
    async fn background_swallows_failure() {
        let n = Notification::new(NotificationKind::Pending, snapshot(1, ""));
        assert!(
            dispatch(Arc::new(Failing), NotifyPolicy::Background, n)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn blocking_delivers_before_returning() {
        let recorder = Arc::new(Recording::default());
        let n = Notification::new(NotificationKind::Completed, snapshot(1, ""));
        dispatch(recorder.clone(), NotifyPolicy::Blocking, n)
            .await
            .unwrap();
        assert_eq!(
            *recorder.0.lock().await,
            ["Ticket #42 Updated To Completed"]
        );
    }
}
