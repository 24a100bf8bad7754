use crate::error::AppError;
use bcrypt::{hash, verify};

/// Hashes `password` with a fresh random salt at the given bcrypt cost.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Hashes a throwaway password at `cost`. The result is never matched by a
/// real login, it only gives unknown-user logins the same bcrypt work.
pub fn dummy_hash(cost: u32) -> Result<String, AppError> {
    hash_password("unknown-user-placeholder", cost)
}

/// Checks `password` against a stored bcrypt hash.
///
/// A malformed hash is treated as a mismatch rather than an error.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    match verify(password, hashed_password) {
        Ok(matches) => matches,
        Err(e) => {
            log::warn!("Stored password hash could not be parsed: {}", e);
            false
        }
    }
}
