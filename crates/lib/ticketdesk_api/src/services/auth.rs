//! Staff account flows delegating to `ticketdesk_core::auth`.

use ticketdesk_core::auth::AuthError;
use ticketdesk_core::auth::jwt::{TokenPair, TokenService};
use ticketdesk_core::auth::password::{
    UNKNOWN_ACCOUNT_DIGEST, hash_password, verify_password,
};
use ticketdesk_core::auth::registration::Registration;
use ticketdesk_core::models::auth::{Identity, NewStaff};
use ticketdesk_core::store::Store;
use tokio::task::spawn_blocking;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{LogoutResponse, RegisterResponse, TokenResponse};

fn token_response(pair: TokenPair) -> TokenResponse {
    TokenResponse {
        token: pair.access_token,
        refresh_token: pair.refresh_token,
        expires_in: pair.ttl.access.num_seconds(),
        refresh_token_expiry: pair.ttl.refresh.num_seconds(),
        token_type: "Bearer".to_string(),
    }
}

/// Register a new staff account.
pub async fn register(store: &dyn Store, registration: Registration) -> AppResult<RegisterResponse> {
    registration.validate()?;

    if store.email_exists(&registration.email).await? {
        return Err(AuthError::DuplicateEmail.into());
    }

    let Registration {
        first_name,
        last_name,
        email,
        password,
    } = registration;
    // bcrypt is CPU-bound; keep it off the async workers.
    let password_hash = spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("hash task: {e}")))??;

    let user_id = store
        .create_staff(&NewStaff {
            first_name,
            last_name,
            email,
            password_hash,
        })
        .await?;
    info!(user_id, "staff user registered");

    Ok(RegisterResponse {
        message: "User registered successfully".into(),
        user_id,
    })
}

/// Authenticate with email + password.
///
/// Unknown email and wrong password fail identically.
pub async fn login(
    store: &dyn Store,
    tokens: &TokenService,
    email: &str,
    password: &str,
) -> AppResult<TokenResponse> {
    if email.is_empty() || password.is_empty() {
        return Err(AppError::Validation("email and password are required".into()));
    }

    let account = store.find_staff_by_email(email).await?;

    // Unknown emails still pay for a bcrypt check so timing does not reveal them.
    let password = password.to_owned();
    let hash = account
        .as_ref()
        .map_or(UNKNOWN_ACCOUNT_DIGEST.to_owned(), |a| a.password_hash.clone());
    let matches = spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("verify task: {e}")))?;
    let Some(account) = account.filter(|_| matches) else {
        return Err(AuthError::CredentialError.into());
    };

    let pair = tokens.issue_pair(&Identity::from(&account.staff))?;
    info!(user_id = account.staff.id, "staff user logged in");
    Ok(token_response(pair))
}

/// Exchange a refresh token for a new pair.
pub fn refresh(tokens: &TokenService, refresh_token: &str) -> AppResult<TokenResponse> {
    if refresh_token.is_empty() {
        return Err(AppError::Validation("refresh_token is required".into()));
    }
    Ok(token_response(tokens.refresh(refresh_token)?))
}

/// Tokens are stateless; logging out is the client discarding them.
pub fn logout() -> LogoutResponse {
    LogoutResponse {
        message: "Successfully logged out".into(),
        instructions: "Please remove the token from your client storage".into(),
    }
}
