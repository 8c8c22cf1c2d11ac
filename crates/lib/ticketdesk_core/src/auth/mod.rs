//! Authentication logic.
//!
//! Provides password hashing, stateless JWT issuance/verification, the
//! per-request auth gate, registration checks, and staff account queries
//! shared with `ticketdesk_api`.

pub mod gate;
pub mod jwt;
pub mod password;
pub mod queries;
pub mod registration;

use thiserror::Error;

use crate::store::StoreError;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    #[error("Authorization header missing")]
    MissingCredential,

    #[error("Invalid authorization format")]
    MalformedCredential,

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Token expired")]
    Expired,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Password hashing failed: {0}")]
    HashingError(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Whether this error means "the caller is not authenticated" as opposed
    /// to a server-side failure.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthError::CredentialError
                | AuthError::MissingCredential
                | AuthError::MalformedCredential
                | AuthError::MalformedToken(_)
                | AuthError::InvalidSignature
                | AuthError::UnsupportedAlgorithm(_)
                | AuthError::Expired
        )
    }
}
