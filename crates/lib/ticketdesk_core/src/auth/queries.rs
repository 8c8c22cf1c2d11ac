//! Staff account database queries.

use sqlx::PgPool;

use crate::models::auth::{NewStaff, Staff, StaffWithPassword};
use crate::store::StoreError;

/// Check whether an email is already registered.
pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, StoreError> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM staff_user WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Create a new staff account inside a transaction, returning its ID.
pub async fn create_staff(pool: &PgPool, staff: &NewStaff) -> Result<i32, StoreError> {
    let mut tx = pool.begin().await?;
    let id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO staff_user (first_name, last_name, email, password) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(&staff.first_name)
    .bind(&staff.last_name)
    .bind(&staff.email)
    .bind(&staff.password_hash)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(id)
}

/// Fetch a staff account and its password hash by email.
pub async fn find_staff_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<StaffWithPassword>, StoreError> {
    let row = sqlx::query_as::<_, (i32, String, String, String, String)>(
        "SELECT id, first_name, last_name, email, password FROM staff_user WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(
        |(id, first_name, last_name, email, password_hash)| StaffWithPassword {
            staff: Staff {
                id,
                first_name,
                last_name,
                email,
            },
            password_hash,
        },
    ))
}

/// Fetch a staff account by ID.
pub async fn get_staff(pool: &PgPool, id: i32) -> Result<Option<Staff>, StoreError> {
    let row = sqlx::query_as::<_, Staff>(
        "SELECT id, first_name, last_name, email FROM staff_user WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// List all staff accounts.
pub async fn list_staff(pool: &PgPool) -> Result<Vec<Staff>, StoreError> {
    let rows = sqlx::query_as::<_, Staff>(
        "SELECT id, first_name, last_name, email FROM staff_user ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
