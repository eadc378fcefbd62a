//! Port for JWT signing and verification.
//!
//! Implemented by the signing-key ring adapter. Verification is
//! signature-first: `verify_raw` authenticates the signature and returns
//! the claims untyped so callers can categorize failures (the M2M verifier
//! needs to tell "expired" from "missing claim" from "wrong mode").

use crate::core::error::TokenError;
use crate::core::token::{AccessClaims, M2mClaims};

/// Contract for token signing against the current key ring.
pub trait TokenSigner: Send + Sync {
    /// Sign a user access token with the current key.
    fn sign_access(&self, claims: &AccessClaims) -> Result<String, TokenError>;

    /// Sign an M2M token with the current key.
    fn sign_m2m(&self, claims: &M2mClaims) -> Result<String, TokenError>;

    /// Verify signature and expiry, requiring `mode == "access"`.
    fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError>;

    /// Verify the signature only; claims come back untyped and unchecked
    /// (no expiry validation). Key selection is by `kid`.
    fn verify_raw(&self, token: &str) -> Result<serde_json::Value, TokenError>;

    /// Public halves of the ring for `/.well-known/jwks.json`.
    fn jwks(&self) -> serde_json::Value;
}
