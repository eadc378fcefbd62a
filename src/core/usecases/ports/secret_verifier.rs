//! Port for client-secret hashing and verification.
//!
//! Implementations must keep unknown-client and wrong-secret paths
//! timing-equal; `verify_or_decoy(None)` burns the same work as a real
//! verification and always answers false.

use crate::core::error::StorageError;

/// Contract for client-secret hashing.
pub trait SecretVerifier: Send + Sync {
    /// Hash a secret for storage.
    fn hash(&self, secret: &str) -> Result<String, StorageError>;

    /// Verify a presented secret; `None` runs the decoy path.
    fn verify_or_decoy(&self, secret: &str, stored_hash: Option<&str>) -> bool;
}
