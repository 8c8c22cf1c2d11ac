//! Staff registration input checks.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use super::AuthError;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,4}$").expect("email pattern compiles")
});

/// Lower-case address, single `@`, two to four letter TLD.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Registration request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Registration {
    pub fn validate(&self) -> Result<(), AuthError> {
        let missing: Vec<&str> = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("password", &self.password),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            return Err(AuthError::ValidationError(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }
        if !is_valid_email(&self.email) {
            return Err(AuthError::ValidationError("invalid email format".into()));
        }
        Ok(())
    }
}
