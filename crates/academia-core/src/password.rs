use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to hash password: {}", e)))
}

/// A `DEFAULT_COST` hash of a password no account uses.
const DUMMY_HASH: &str = "$2b$12$oVVdUu0Ja6kl2uqZNG9qouAzytNBWsfm16g1oMWaH14dF2ehg3eo.";

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to verify password: {}", e)))
}

/// Like [`verify_password`], but with no stored hash the check still runs
/// against a dummy hash and fails, so a missing account costs the same as a
/// wrong password.
pub fn verify_password_or_dummy(password: &str, hash: Option<&str>) -> Result<bool, AppError> {
    match hash {
        Some(hash) => verify_password(password, hash),
        None => verify_password(password, DUMMY_HASH).map(|_| false),
    }
}
