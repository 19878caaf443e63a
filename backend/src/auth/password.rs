//! Password hashing using bcrypt
//!
//! Work factor 12, which keeps offline brute force expensive while staying
//! within interactive-login latency budgets.
//!
//! # Performance Considerations
//!
//! bcrypt is intentionally CPU-intensive. Handlers should use the `_async`
//! variants, which run the work on the blocking thread pool.

use anyhow::Result;

/// bcrypt cost factor (2^12 rounds)
const BCRYPT_COST: u32 = 12;

/// Password hashing service
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using bcrypt (blocking operation)
    ///
    /// Each call salts independently, so hashing the same password twice
    /// yields different digests.
    pub fn hash(password: &str) -> Result<String> {
        bcrypt::hash(password, BCRYPT_COST)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
    }

    /// Hash a password asynchronously (non-blocking)
    pub async fn hash_async(password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password against a digest (blocking operation)
    ///
    /// A malformed digest verifies as `false`; this never errors, so a
    /// corrupted row cannot turn a login into a 500.
    pub fn verify(password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }

    /// Verify a password asynchronously (non-blocking)
    pub async fn verify_async(password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))
    }
}
