//! Ticket domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::serde_ext::{base64_bytes, wall_clock};

// =============================================================================
// Enums
// =============================================================================

/// Ticket workflow state. Any state may be reached from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    Assigned,
    Pending,
    Completed,
}

impl TaskStatus {
    /// Status every ticket starts in.
    pub const INITIAL: TaskStatus = TaskStatus::Assigned;

    pub const fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Assigned => "Assigned",
            TaskStatus::Pending => "Pending",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "assigned" => Ok(TaskStatus::Assigned),
            "pending" => Ok(TaskStatus::Pending),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(format!(
                "invalid task_status {s:?}: expected Assigned, Pending or Completed"
            )),
        }
    }
}

/// Alert level stamped on creation; not patchable.
pub const INITIAL_ALERT_LEVEL: i32 = 0;

// =============================================================================
// Ticket
// =============================================================================

/// Full ticket row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ticket {
    pub id: i32,
    pub reported_by: String,
    pub accommodation_name: String,
    pub accommodation_room_number: i32,
    pub accommodation_specific_location: String,
    pub accommodation_type: String,
    pub request_type: String,
    pub request_detail: String,
    pub task_status: TaskStatus,
    pub task_priority: String,
    pub alert_level: i32,
    pub assigned_to: i32,
    pub note: String,
    #[serde(with = "base64_bytes")]
    pub image: Vec<u8>,
    /// Wall-clock time in the server's fixed zone, set once on insert.
    #[serde(with = "wall_clock")]
    pub created_date: NaiveDateTime,
    #[serde(with = "wall_clock::option")]
    pub completion_date: Option<NaiveDateTime>,
}

/// Validated ticket creation data.
///
/// Status, alert level and creation date are not part of it: storage stamps
/// [`TaskStatus::INITIAL`], [`INITIAL_ALERT_LEVEL`] and the supplied date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub reported_by: String,
    pub accommodation_name: String,
    pub accommodation_room_number: i32,
    pub accommodation_specific_location: String,
    pub accommodation_type: String,
    pub request_type: String,
    pub request_detail: String,
    pub task_priority: String,
    pub assigned_to: i32,
    pub note: String,
    pub image: Vec<u8>,
}

impl NewTicket {
    /// Materialise the row storage will hold for this ticket.
    pub fn into_ticket(self, id: i32, created_date: NaiveDateTime) -> Ticket {
        Ticket {
            id,
            reported_by: self.reported_by,
            accommodation_name: self.accommodation_name,
            accommodation_room_number: self.accommodation_room_number,
            accommodation_specific_location: self.accommodation_specific_location,
            accommodation_type: self.accommodation_type,
            request_type: self.request_type,
            request_detail: self.request_detail,
            task_status: TaskStatus::INITIAL,
            task_priority: self.task_priority,
            alert_level: INITIAL_ALERT_LEVEL,
            assigned_to: self.assigned_to,
            note: self.note,
            image: self.image,
            created_date,
            completion_date: None,
        }
    }
}
