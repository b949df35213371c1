//! bcrypt password hashing.
//!
//! Hashing is CPU bound, so both functions run on the blocking pool.

use crate::AuthError;

/// Hashes a password with the given bcrypt cost.
pub async fn hash_password(password: String, cost: u32) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AuthError::Hash(e.to_string()))?
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Checks a password against a stored hash.
///
/// A malformed hash verifies as `false`.
pub async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Hash(e.to_string()))?;

    match verified {
        Ok(matches) => Ok(matches),
        Err(e) => {
            tracing::warn!("Stored password hash is unreadable: {}", e);
            Ok(false)
        }
    }
}
