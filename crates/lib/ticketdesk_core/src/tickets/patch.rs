//! Sparse ticket patches.
//!
//! On the wire a patch field may be missing or carry its "unset" sentinel
//! (`""` for text, `-1` for the room number and assignee, an empty image).
//! [`SparsePatch::into_patch`] folds both into `None`, so past this point
//! presence is explicit and "set to empty" cannot be confused with "omitted".

use serde::Deserialize;

use super::TicketError;
use crate::models::serde_ext::{base64_bytes, lenient_int};
use crate::models::ticket::{TaskStatus, Ticket};

/// Integer sentinel meaning "field omitted".
pub const UNSET_INT: i32 = -1;

const fn unset_int() -> i32 {
    UNSET_INT
}

fn int_or_unset<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    Ok(lenient_int::optional(deserializer)?.unwrap_or(UNSET_INT))
}

/// Patch document as received from clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SparsePatch {
    #[serde(default)]
    pub reported_by: String,
    #[serde(default)]
    pub accommodation_name: String,
    #[serde(default = "unset_int", deserialize_with = "int_or_unset")]
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
    pub task_status: String,
    #[serde(default)]
    pub task_priority: String,
    #[serde(default = "unset_int", deserialize_with = "int_or_unset")]
    pub assigned_to: i32,
    #[serde(default)]
    pub note: String,
    #[serde(default, with = "base64_bytes")]
    pub image: Vec<u8>,
}

impl Default for SparsePatch {
    /// Every field at its sentinel.
    fn default() -> Self {
        Self {
            reported_by: String::new(),
            accommodation_name: String::new(),
            accommodation_room_number: UNSET_INT,
            accommodation_specific_location: String::new(),
            accommodation_type: String::new(),
            request_type: String::new(),
            request_detail: String::new(),
            task_status: String::new(),
            task_priority: String::new(),
            assigned_to: UNSET_INT,
            note: String::new(),
            image: Vec::new(),
        }
    }
}

fn text(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn int(field: TicketField, value: i32) -> Result<Option<i32>, TicketError> {
    match value {
        UNSET_INT => Ok(None),
        v if v < 0 => Err(TicketError::Validation(format!(
            "{} must be >= 0, got {v}",
            field.column()
        ))),
        v => Ok(Some(v)),
    }
}

impl SparsePatch {
    /// Resolve sentinels into explicit presence and validate present values.
    pub fn into_patch(self) -> Result<TicketPatch, TicketError> {
        let task_status = match text(self.task_status) {
            Some(raw) => Some(raw.parse::<TaskStatus>().map_err(TicketError::Validation)?),
            None => None,
        };
        Ok(TicketPatch {
            reported_by: text(self.reported_by),
            accommodation_name: text(self.accommodation_name),
            accommodation_room_number: int(
                TicketField::AccommodationRoomNumber,
                self.accommodation_room_number,
            )?,
            accommodation_specific_location: text(self.accommodation_specific_location),
            accommodation_type: text(self.accommodation_type),
            request_type: text(self.request_type),
            request_detail: text(self.request_detail),
            task_status,
            task_priority: text(self.task_priority),
            assigned_to: int(TicketField::AssignedTo, self.assigned_to)?,
            note: text(self.note),
            image: (!self.image.is_empty()).then_some(self.image),
        })
    }
}

/// Patchable ticket columns, in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TicketField {
    ReportedBy,
    AccommodationName,
    AccommodationRoomNumber,
    AccommodationSpecificLocation,
    AccommodationType,
    RequestType,
    RequestDetail,
    TaskStatus,
    TaskPriority,
    AssignedTo,
    Note,
    Image,
}

impl TicketField {
    /// Column name. A fixed identifier, never derived from input.
    pub const fn column(self) -> &'static str {
        match self {
            TicketField::ReportedBy => "reported_by",
            TicketField::AccommodationName => "accommodation_name",
            TicketField::AccommodationRoomNumber => "accommodation_room_number",
            TicketField::AccommodationSpecificLocation => "accommodation_specific_location",
            TicketField::AccommodationType => "accommodation_type",
            TicketField::RequestType => "request_type",
            TicketField::RequestDetail => "request_detail",
            TicketField::TaskStatus => "task_status",
            TicketField::TaskPriority => "task_priority",
            TicketField::AssignedTo => "assigned_to",
            TicketField::Note => "note",
            TicketField::Image => "image",
        }
    }
}

/// A value to bind for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Int(i32),
    Status(TaskStatus),
    Bytes(Vec<u8>),
}

/// Ticket patch with explicit presence per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketPatch {
    pub reported_by: Option<String>,
    pub accommodation_name: Option<String>,
    pub accommodation_room_number: Option<i32>,
    pub accommodation_specific_location: Option<String>,
    pub accommodation_type: Option<String>,
    pub request_type: Option<String>,
    pub request_detail: Option<String>,
    pub task_status: Option<TaskStatus>,
    pub task_priority: Option<String>,
    pub assigned_to: Option<i32>,
    pub note: Option<String>,
    pub image: Option<Vec<u8>>,
}

impl TicketPatch {
    /// `column = value` pairs for every present field, in schema order.
    pub fn assignments(&self) -> Vec<(TicketField, FieldValue)> {
        use FieldValue::{Bytes, Int, Status, Text};

        let mut out = Vec::new();
        let mut push = |field, value: Option<FieldValue>| {
            if let Some(value) = value {
                out.push((field, value));
            }
        };
        push(TicketField::ReportedBy, self.reported_by.clone().map(Text));
        push(TicketField::AccommodationName, self.accommodation_name.clone().map(Text));
        push(TicketField::AccommodationRoomNumber, self.accommodation_room_number.map(Int));
        push(
            TicketField::AccommodationSpecificLocation,
            self.accommodation_specific_location.clone().map(Text),
        );
        push(TicketField::AccommodationType, self.accommodation_type.clone().map(Text));
        push(TicketField::RequestType, self.request_type.clone().map(Text));
        push(TicketField::RequestDetail, self.request_detail.clone().map(Text));
        push(TicketField::TaskStatus, self.task_status.map(Status));
        push(TicketField::TaskPriority, self.task_priority.clone().map(Text));
        push(TicketField::AssignedTo, self.assigned_to.map(Int));
        push(TicketField::Note, self.note.clone().map(Text));
        push(TicketField::Image, self.image.clone().map(Bytes));
        out
    }

    pub fn is_empty(&self) -> bool {
        self.assignments().is_empty()
    }

    /// Apply present fields to an in-memory row; absent fields are untouched.
    pub fn apply_to(&self, ticket: &mut Ticket) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }
        set(&mut ticket.reported_by, &self.reported_by);
        set(&mut ticket.accommodation_name, &self.accommodation_name);
        set(&mut ticket.accommodation_room_number, &self.accommodation_room_number);
        set(
            &mut ticket.accommodation_specific_location,
            &self.accommodation_specific_location,
        );
        set(&mut ticket.accommodation_type, &self.accommodation_type);
        set(&mut ticket.request_type, &self.request_type);
        set(&mut ticket.request_detail, &self.request_detail);
        set(&mut ticket.task_status, &self.task_status);
        set(&mut ticket.task_priority, &self.task_priority);
        set(&mut ticket.assigned_to, &self.assigned_to);
        set(&mut ticket.note, &self.note);
        set(&mut ticket.image, &self.image);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_sentinels_is_empty() {
        let patch = SparsePatch::default().into_patch().unwrap();
        assert!(patch.is_empty());
        assert_eq!(patch, TicketPatch::default());
    }

    #[test]
    fn missing_fields_read_as_sentinels() {
        let sparse: SparsePatch = serde_json::from_str("{}").unwrap();
        assert_eq!(sparse, SparsePatch::default());
    }

    #[test]
    fn zero_is_a_present_integer() {
        let sparse: SparsePatch =
            serde_json::from_str(r#"{"accommodation_room_number": "0", "assigned_to": 0}"#)
                .unwrap();
        let patch = sparse.into_patch().unwrap();
        assert_eq!(patch.accommodation_room_number, Some(0));
        assert_eq!(patch.assigned_to, Some(0));
    }

    #[test]
    fn null_integers_read_as_unset() {
        let sparse: SparsePatch = serde_json::from_str(
            r#"{"accommodation_room_number": null, "assigned_to": null, "note": "n"}"#,
        )
        .unwrap();
        let patch = sparse.into_patch().unwrap();
        assert_eq!(patch.accommodation_room_number, None);
        assert_eq!(patch.assigned_to, None);
        assert_eq!(patch.note.as_deref(), Some("n"));
    }

    #[test]
    fn other_negative_integers_are_rejected() {
        let sparse = SparsePatch {
            assigned_to: -2,
            ..SparsePatch::default()
        };
        assert!(matches!(sparse.into_patch(), Err(TicketError::Validation(_))));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let sparse = SparsePatch {
            task_status: "Closed".into(),
            ..SparsePatch::default()
        };
        assert!(matches!(sparse.into_patch(), Err(TicketError::Validation(_))));
    }

    #[test]
    fn assignments_follow_schema_order() {
        let patch = TicketPatch {
            note: Some("n".into()),
            reported_by: Some("r".into()),
            task_status: Some(TaskStatus::Pending),
            ..TicketPatch::default()
        };
        let columns: Vec<_> = patch
            .assignments()
            .into_iter()
            .map(|(f, _)| f.column())
            .collect();
        assert_eq!(columns, ["reported_by", "task_status", "note"]);
    }
}
