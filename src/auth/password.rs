use bcrypt::{hash, verify, DEFAULT_COST};
use tracing::error;

use crate::error::AppError;

pub fn hash_password(plain: &str) -> Result<String, AppError> {
    hash(plain, DEFAULT_COST).map_err(|e| {
        error!(error = %e, "bcrypt hash error");
        AppError::Internal(e.to_string())
    })
}

/// Returns false on mismatch or on an unparseable hash; never errors.
pub fn verify_password(plain: &str, hashed: &str) -> bool {
    verify(plain, hashed).unwrap_or(false)
}
