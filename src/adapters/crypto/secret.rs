//! Argon2id client-secret hashing.
//!
//! Client secrets are stored only as PHC strings with a pinned cost. The
//! unknown-client path verifies the presented secret against a fixed decoy
//! hash so response timing does not reveal whether a client id exists.
//!
//! # Design Principles
//!
//! - **Pure cryptographic**: No registry lookups, no policy
//! - **Timing-equal**: Known-bad and unknown-client take the same path
//! - **No secret leakage**: Secrets are never logged or exposed in errors

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::core::error::StorageError;
use crate::core::usecases::ports::SecretVerifier;

/// Pinned Argon2id parameters: 19 MiB memory, 2 iterations, 1 lane.
/// Changing these invalidates no stored hashes (parameters ride the PHC
/// string) but new hashes must stay server-affordable.
const MEMORY_COST_KIB: u32 = 19 * 1024;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;

/// Argon2id hasher for OAuth client secrets.
pub struct ClientSecretHasher {
    argon2: Argon2<'static>,
    /// Hash of a random throwaway secret, verified on unknown-client paths
    decoy_hash: String,
}

impl ClientSecretHasher {
    pub fn new() -> Result<Self, StorageError> {
        let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
            .map_err(|e| StorageError::unavailable(format!("invalid argon2 parameters: {}", e)))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let salt = SaltString::generate(&mut OsRng);
        let decoy_hash = argon2
            .hash_password(uuid::Uuid::new_v4().to_string().as_bytes(), &salt)
            .map_err(|e| StorageError::unavailable(format!("decoy hash failed: {}", e)))?
            .to_string();

        Ok(Self { argon2, decoy_hash })
    }

    /// Constant-time verification against a stored PHC string.
    pub fn verify(&self, secret: &str, stored_hash: &str) -> bool {
        PasswordHash::new(stored_hash)
            .map(|parsed| {
                self.argon2
                    .verify_password(secret.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

impl SecretVerifier for ClientSecretHasher {
    /// Hash a secret for storage (PHC string, salt included).
    fn hash(&self, secret: &str) -> Result<String, StorageError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| StorageError::unavailable(format!("hashing failed: {}", e)))
    }

    /// Verification for a possibly-unknown client: when `stored_hash` is
    /// `None` the presented secret is checked against the decoy so both
    /// paths cost one argon2 verification. Always false for `None`.
    fn verify_or_decoy(&self, secret: &str, stored_hash: Option<&str>) -> bool {
        match stored_hash {
            Some(stored_hash) => self.verify(secret, stored_hash),
            None => {
                let _ = self.verify(secret, &self.decoy_hash);
                false
            }
        }
    }
}
