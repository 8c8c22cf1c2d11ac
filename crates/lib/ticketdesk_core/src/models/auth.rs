//! Authentication domain models.
//!
//! These are internal domain models; the HTTP layer wraps them in its own
//! request/response types where the wire shape differs.

use serde::{Deserialize, Serialize};

/// Staff account as exposed to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Staff {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Staff {
    /// Display name used in notifications.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Staff account with password hash (for internal auth flows).
#[derive(Debug, Clone)]
pub struct StaffWithPassword {
    pub staff: Staff,
    pub password_hash: String,
}

/// Validated registration data, password already hashed.
#[derive(Debug, Clone)]
pub struct NewStaff {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Who a token speaks for. Carried unchanged from token to token on refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i32,
    pub first_name: String,
    pub last_name: String,
}

impl From<&Staff> for Identity {
    fn from(staff: &Staff) -> Self {
        Self {
            user_id: staff.id,
            first_name: staff.first_name.clone(),
            last_name: staff.last_name.clone(),
        }
    }
}

/// JWT claims embedded in access and refresh tokens.
///
/// Both token kinds share this shape; only `exp - iat` differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Staff account primary key.
    pub user_id: i32,
    pub first_name: String,
    pub last_name: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

impl TokenClaims {
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}
