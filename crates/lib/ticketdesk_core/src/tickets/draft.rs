//! Ticket creation input.

use serde::Deserialize;

use super::TicketError;
use crate::models::serde_ext::{base64_bytes, lenient_int};
use crate::models::ticket::NewTicket;

fn room_or_zero<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    Ok(lenient_int::optional(deserializer)?.unwrap_or_default())
}

/// Creation request as received from clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TicketDraft {
    #[serde(default)]
    pub reported_by: String,
    #[serde(default)]
    pub accommodation_name: String,
    #[serde(default, deserialize_with = "room_or_zero")]
    pub accommodation_room_number: i32,
    #[serde(default)]
    pub accommodation_specific_location: String,
    #[serde(default)]
    pub accommodation_type: String,
    #[serde(default)]
    pub request_type: String,
    #[serde(default)]
    pub request_detail: String,
    #[serde(default)]
    pub task_priority: String,
    #[serde(deserialize_with = "lenient_int::deserialize")]
    pub assigned_to: i32,
    #[serde(default)]
    pub note: String,
    #[serde(default, with = "base64_bytes")]
    pub image: Vec<u8>,
}

impl TicketDraft {
    /// Check required fields and ranges.
    pub fn validate(self) -> Result<NewTicket, TicketError> {
        let required = [
            ("accommodation_name", &self.accommodation_name),
            (
                "accommodation_specific_location",
                &self.accommodation_specific_location,
            ),
            ("accommodation_type", &self.accommodation_type),
            ("request_type", &self.request_type),
            ("request_detail", &self.request_detail),
            ("task_priority", &self.task_priority),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(TicketError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }
        if self.accommodation_room_number < 0 {
            return Err(TicketError::Validation(
                "accommodation_room_number must be >= 0".into(),
            ));
        }
        if self.assigned_to < 0 {
            return Err(TicketError::Validation("assigned_to must be >= 0".into()));
        }

        Ok(NewTicket {
            reported_by: self.reported_by,
            accommodation_name: self.accommodation_name,
            accommodation_room_number: self.accommodation_room_number,
            accommodation_specific_location: self.accommodation_specific_location,
            accommodation_type: self.accommodation_type,
            request_type: self.request_type,
            request_detail: self.request_detail,
            task_priority: self.task_priority,
            assigned_to: self.assigned_to,
            note: self.note,
            image: self.image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> serde_json::Value {
        serde_json::json!({
            "accommodation_name": "Lodge",
            "accommodation_room_number": "204",
            "accommodation_specific_location": "bathroom",
            "accommodation_type": "hotel",
            "request_type": "maintenance",
            "request_detail": "leaking tap",
            "task_priority": "High",
            "assigned_to": "4",
        })
    }

    #[test]
    fn complete_draft_validates() {
        let draft: TicketDraft = serde_json::from_value(complete()).unwrap();
        let ticket = draft.validate().unwrap();
        assert_eq!(ticket.accommodation_room_number, 204);
        assert_eq!(ticket.assigned_to, 4);
        assert!(ticket.note.is_empty());
        assert!(ticket.image.is_empty());
    }

    #[test]
    fn assignee_is_required_on_the_wire() {
        let mut body = complete();
        body.as_object_mut().unwrap().remove("assigned_to");
        assert!(serde_json::from_value::<TicketDraft>(body).is_err());
    }

    #[test]
    fn null_room_number_defaults_to_zero() {
        let mut body = complete();
        body["accommodation_room_number"] = serde_json::Value::Null;
        let draft: TicketDraft = serde_json::from_value(body).unwrap();
        assert_eq!(draft.validate().unwrap().accommodation_room_number, 0);
    }

    #[test]
    fn blank_required_fields_are_listed() {
        let mut body = complete();
        body["request_type"] = "  ".into();
        body["task_priority"] = "".into();
        let draft: TicketDraft = serde_json::from_value(body).unwrap();
        match draft.validate() {
            Err(TicketError::Validation(msg)) => {
                assert!(msg.contains("request_type"));
                assert!(msg.contains("task_priority"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
