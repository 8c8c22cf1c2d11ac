//! Request-boundary auth gate.
//!
//! Turns the raw `Authorization` header value of one request into an
//! authenticated identity, or rejects it. Holds no state between requests
//! and knows nothing of roles: every authenticated caller may act on every
//! ticket.

use super::AuthError;
use super::jwt::TokenService;
use crate::models::auth::TokenClaims;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from a `Bearer <token>` credential.
pub fn bearer_token(header: &str) -> Result<&str, AuthError> {
    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::MalformedCredential)?;
    if token.is_empty() || token.contains(' ') {
        return Err(AuthError::MalformedCredential);
    }
    Ok(token)
}

/// Run the gate: require a header, require the Bearer form, verify the token.
///
/// `Ok` is the authenticated state for the rest of the request; any `Err`
/// leaves the request unauthenticated.
pub fn authenticate(header: Option<&str>, tokens: &TokenService) -> Result<TokenClaims, AuthError> {
    let header = header.ok_or(AuthError::MissingCredential)?;
    let token = bearer_token(header)?;
    tokens.verify(token)
}
