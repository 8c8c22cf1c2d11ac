//! Ticket database queries.
//!
//! Raw SQLx queries. Column names come from [`TicketField::column`]; every
//! value is a bound parameter.

use chrono::NaiveDateTime;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::patch::{FieldValue, TicketField, TicketPatch};
use crate::models::ticket::{INITIAL_ALERT_LEVEL, NewTicket, TaskStatus, Ticket};
use crate::store::StoreError;

const TICKET_COLUMNS: &str = "id, reported_by, accommodation_name, accommodation_room_number, \
     accommodation_specific_location, accommodation_type, request_type, request_detail, \
     task_status, task_priority, alert_level, assigned_to, note, image, \
     created_date, completion_date";

/// Insert a ticket inside a transaction, returning its ID.
pub async fn insert_ticket(
    pool: &PgPool,
    ticket: &NewTicket,
    created_date: NaiveDateTime,
) -> Result<i32, StoreError> {
    let mut tx = pool.begin().await?;
    let id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO ticket (
            reported_by, accommodation_name, accommodation_room_number,
            accommodation_specific_location, accommodation_type, request_type,
            request_detail, task_status, task_priority, alert_level,
            assigned_to, note, image, created_date
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING id
        "#,
    )
    .bind(&ticket.reported_by)
    .bind(&ticket.accommodation_name)
    .bind(ticket.accommodation_room_number)
    .bind(&ticket.accommodation_specific_location)
    .bind(&ticket.accommodation_type)
    .bind(&ticket.request_type)
    .bind(&ticket.request_detail)
    .bind(TaskStatus::INITIAL)
    .bind(&ticket.task_priority)
    .bind(INITIAL_ALERT_LEVEL)
    .bind(ticket.assigned_to)
    .bind(&ticket.note)
    .bind(&ticket.image)
    .bind(created_date)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(id)
}

pub async fn ticket_exists(pool: &PgPool, id: i32) -> Result<bool, StoreError> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM ticket WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

pub async fn get_ticket(pool: &PgPool, id: i32) -> Result<Option<Ticket>, StoreError> {
    let row = sqlx::query_as::<_, Ticket>(&format!(
        "SELECT {TICKET_COLUMNS} FROM ticket WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// List all tickets, newest first.
pub async fn list_tickets(pool: &PgPool) -> Result<Vec<Ticket>, StoreError> {
    let rows = sqlx::query_as::<_, Ticket>(&format!(
        "SELECT {TICKET_COLUMNS} FROM ticket ORDER BY created_date DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Build `UPDATE ticket SET <col> = $n, ... WHERE id = $m` for the present
/// fields of `patch`. `None` when nothing is present.
pub fn build_update(id: i32, patch: &TicketPatch) -> Option<QueryBuilder<'static, Postgres>> {
    let assignments = patch.assignments();
    if assignments.is_empty() {
        return None;
    }

    let mut qb = QueryBuilder::new("UPDATE ticket SET ");
    let mut set = qb.separated(", ");
    for (field, value) in assignments {
        set.push(field.column());
        set.push_unseparated(" = ");
        match value {
            FieldValue::Text(v) => set.push_bind_unseparated(v),
            FieldValue::Int(v) => set.push_bind_unseparated(v),
            FieldValue::Status(v) => set.push_bind_unseparated(v),
            FieldValue::Bytes(v) => set.push_bind_unseparated(v),
        };
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id);
    Some(qb)
}

/// Apply a sparse patch in one statement. Returns rows affected.
pub async fn update_ticket(pool: &PgPool, id: i32, patch: &TicketPatch) -> Result<u64, StoreError> {
    let Some(mut qb) = build_update(id, patch) else {
        return Ok(0);
    };
    let result = qb.build().execute(pool).await?;
    Ok(result.rows_affected())
}

/// Overwrite the status inside a transaction, returning the updated row.
pub async fn set_ticket_status(
    pool: &PgPool,
    id: i32,
    status: TaskStatus,
) -> Result<Option<Ticket>, StoreError> {
    let mut tx = pool.begin().await?;
    let row = sqlx::query_as::<_, Ticket>(&format!(
        "UPDATE ticket SET task_status = $1 WHERE id = $2 RETURNING {TICKET_COLUMNS}"
    ))
    .bind(status)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(row)
}

/// Hard delete. Returns rows affected.
pub async fn delete_ticket(pool: &PgPool, id: i32) -> Result<u64, StoreError> {
    let result = sqlx::query("DELETE FROM ticket WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch_builds_nothing() {
        assert!(build_update(1, &TicketPatch::default()).is_none());
    }

    #[test]
    fn single_field_update_sql() {
        let patch = TicketPatch {
            note: Some("hello".into()),
            ..TicketPatch::default()
        };
        let qb = build_update(7, &patch).unwrap();
        assert_eq!(qb.sql(), "UPDATE ticket SET note = $1 WHERE id = $2");
    }

    #[test]
    fn multi_field_update_sql_in_schema_order() {
        let patch = TicketPatch {
            image: Some(vec![0xff]),
            accommodation_room_number: Some(0),
            task_status: Some(TaskStatus::Completed),
            reported_by: Some("front desk".into()),
            ..TicketPatch::default()
        };
        let qb = build_update(3, &patch).unwrap();
        assert_eq!(
            qb.sql(),
            "UPDATE ticket SET reported_by = $1, accommodation_room_number = $2, \
             task_status = $3, image = $4 WHERE id = $5"
        );
    }

    #[test]
    fn values_never_reach_sql_text() {
        let payload = "x'); DROP TABLE ticket;--";
        let patch = TicketPatch {
            note: Some(payload.into()),
            request_detail: Some(payload.into()),
            ..TicketPatch::default()
        };
        let qb = build_update(1, &patch).unwrap();
        assert!(!qb.sql().contains("DROP"));
        assert!(!qb.sql().contains('\''));
    }
}
