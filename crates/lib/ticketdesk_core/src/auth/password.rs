//! Password hashing via bcrypt.

use tracing::debug;

use super::AuthError;

/// bcrypt cost factor.
pub const BCRYPT_COST: u32 = 12;

/// Hash a password with bcrypt (cost 12, random salt).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash_password_with_cost(password, BCRYPT_COST)
}

pub(crate) fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password, cost).map_err(|e| AuthError::HashingError(format!("bcrypt hash: {e}")))
}

/// Well-formed cost-12 digest that no password is expected to match.
///
/// Checked against when an account does not exist so the lookup costs the same as a wrong password.
pub const UNKNOWN_ACCOUNT_DIGEST: &str =
    "$2b$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW";

/// Verify a password against a bcrypt hash.
///
/// A mismatch and an unparseable digest both yield `false`.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            debug!("bcrypt verify rejected stored digest: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Cost 4 keeps the round-trip tests fast; the production cost is asserted separately.
    const TEST_COST: u32 = 4;

    #[test]
    fn production_cost_is_twelve() {
        assert_eq!(BCRYPT_COST, 12);
    }

    #[test]
    fn hash_then_verify() {
        let digest = hash_password_with_cost("correct horse", TEST_COST).unwrap();
        assert!(verify_password("correct horse", &digest));
        assert!(!verify_password("battery staple", &digest));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password_with_cost("same", TEST_COST).unwrap();
        let b = hash_password_with_cost("same", TEST_COST).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_digest_is_a_mismatch() {
        assert!(!verify_password("anything", "not-a-bcrypt-digest"));
    }

    #[test]
    fn unknown_account_digest_is_parsed_and_costs_twelve() {
        let parts: bcrypt::HashParts = UNKNOWN_ACCOUNT_DIGEST.parse().unwrap();
        assert_eq!(parts.get_cost(), BCRYPT_COST);
        // A parse failure would skip the key schedule and answer instantly.
        assert_eq!(bcrypt::verify("hunter2", UNKNOWN_ACCOUNT_DIGEST).ok(), Some(false));
    }

    #[test]
    fn default_hash_uses_cost_twelve() {
        let digest = hash_password("pw").unwrap();
        assert!(digest.starts_with("$2b$12$"));
    }
}
