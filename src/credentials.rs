//! Password hashing with bcrypt.
//!
//! bcrypt is deliberately slow, so both operations run on the blocking pool
//! instead of stalling the async worker that handles the request.

use thiserror::Error;
use tokio::task::{self, JoinError};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("hashing task aborted: {0}")]
    Join(#[from] JoinError),
}

/// Hashes `password` with a fresh random salt at the given work factor.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, CredentialError> {
    let password = password.to_owned();
    let hashed = task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hashed)
}

/// Returns `Ok(false)` for a wrong password; `Err` only when the stored hash is unusable.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, CredentialError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    let matches = task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(matches)
}
