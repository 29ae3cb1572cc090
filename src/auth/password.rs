use actix_web::web;
use bcrypt::{hash, verify};

use crate::error::AppError;

pub use bcrypt::DEFAULT_COST;

/// Hashes on the blocking pool; bcrypt at the default cost takes long
/// enough to stall a worker.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password = password.to_string();
    web::block(move || hash(password, cost))
        .await
        .map_err(|e| AppError::InternalServerError(format!("Password hashing was cancelled: {}", e)))?
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// A malformed stored hash counts as a mismatch rather than a server error:
/// the caller only learns that the credentials did not match.
pub async fn verify_password(password: &str, hashed_password: &str) -> bool {
    let password = password.to_string();
    let hashed_password = hashed_password.to_string();
    match web::block(move || verify(password, &hashed_password)).await {
        Ok(Ok(matches)) => matches,
        Ok(Err(e)) => {
            log::warn!("Stored password hash could not be checked: {}", e);
            false
        }
        Err(e) => {
            log::error!("Password verification was cancelled: {}", e);
            false
        }
    }
}
