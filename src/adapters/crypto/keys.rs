//! Ed25519 signing-key ring.
//!
//! This module provides the concrete implementation of the `TokenSigner`
//! port: a ring of Ed25519 keypairs signing JWTs via the jsonwebtoken
//! library. Entries carry a `kid`; verification selects by `kid`, so old
//! tokens stay verifiable after rotation. The ring is read-mostly and
//! swapped through an atomic `Arc` behind an `RwLock`.
//!
//! # Design Principles
//!
//! - **Pure cryptographic**: No session awareness, no revocation checks
//! - **No secret leakage**: Seeds are never logged or exposed in errors
//! - **Algorithm enforcement**: Only EdDSA is accepted

use std::sync::{Arc, RwLock};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use ed25519_dalek::pkcs8::EncodePrivateKey;
use ed25519_dalek::SigningKey as EdSigningKey;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngExt;

use crate::core::error::TokenError;
use crate::core::token::{AccessClaims, M2mClaims};
use crate::core::usecases::ports::TokenSigner;

/// Ed25519 seed size.
pub const SEED_LEN: usize = 32;

struct RingEntry {
    kid: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    public: [u8; SEED_LEN],
}

struct RingInner {
    entries: Vec<RingEntry>,
    /// Index of the key used for new signatures
    current: usize,
}

/// Signing-key ring implementing the [`TokenSigner`] port.
pub struct SigningKeyRing {
    inner: RwLock<Arc<RingInner>>,
    /// Leeway applied to `exp` checks, seconds
    clock_tolerance: i64,
}

impl SigningKeyRing {
    /// Build a ring from `(kid, seed)` pairs; the last entry signs.
    pub fn new(keys: Vec<(String, [u8; SEED_LEN])>) -> Result<Self, TokenError> {
        if keys.is_empty() {
            return Err(TokenError::invalid("key ring cannot be empty"));
        }
        let entries = keys
            .into_iter()
            .map(|(kid, seed)| Self::build_entry(kid, seed))
            .collect::<Result<Vec<_>, _>>()?;
        let current = entries.len() - 1;
        Ok(Self {
            inner: RwLock::new(Arc::new(RingInner { entries, current })),
            clock_tolerance: 30,
        })
    }

    /// Single fresh random key, for first boot.
    pub fn generate() -> Result<Self, TokenError> {
        let (kid, seed) = Self::generate_key();
        Self::new(vec![(kid, seed)])
    }

    /// Produce a fresh `(kid, seed)` pair.
    pub fn generate_key() -> (String, [u8; SEED_LEN]) {
        let mut seed = [0u8; SEED_LEN];
        rand::rng().fill(&mut seed);
        (uuid::Uuid::new_v4().to_string(), seed)
    }

    pub fn with_clock_tolerance(mut self, seconds: i64) -> Self {
        self.clock_tolerance = seconds;
        self
    }

    /// Add a key and make it the signer. Existing entries keep verifying.
    pub fn rotate(&self, kid: String, seed: [u8; SEED_LEN]) -> Result<(), TokenError> {
        let entry = Self::build_entry(kid, seed)?;
        let mut guard = self.inner.write().expect("key ring lock poisoned");
        let mut entries: Vec<RingEntry> = Vec::with_capacity(guard.entries.len() + 1);
        for existing in &guard.entries {
            entries.push(RingEntry {
                kid: existing.kid.clone(),
                encoding_key: existing.encoding_key.clone(),
                decoding_key: existing.decoding_key.clone(),
                public: existing.public,
            });
        }
        entries.push(entry);
        let current = entries.len() - 1;
        *guard = Arc::new(RingInner { entries, current });
        Ok(())
    }

    fn build_entry(kid: String, seed: [u8; SEED_LEN]) -> Result<RingEntry, TokenError> {
        let signing_key = EdSigningKey::from_bytes(&seed);
        let public = signing_key.verifying_key().to_bytes();

        let pkcs8 = signing_key
            .to_pkcs8_der()
            .map_err(|e| TokenError::invalid(format!("key encoding failed: {}", e)))?;
        let encoding_key = EncodingKey::from_ed_der(pkcs8.as_bytes());
        let decoding_key = DecodingKey::from_ed_components(&URL_SAFE_NO_PAD.encode(public))
            .map_err(|e| TokenError::invalid(format!("public key rejected: {}", e)))?;

        Ok(RingEntry {
            kid,
            encoding_key,
            decoding_key,
            public,
        })
    }

    fn snapshot(&self) -> Arc<RingInner> {
        self.inner.read().expect("key ring lock poisoned").clone()
    }

    fn sign<T: serde::Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        let ring = self.snapshot();
        let entry = &ring.entries[ring.current];
        let mut header = Header::new(Algorithm::EdDSA);
        header.kid = Some(entry.kid.clone());
        encode(&header, claims, &entry.encoding_key)
            .map_err(|e| TokenError::invalid(format!("signing failed: {}", e)))
    }

    fn raw_validation() -> Validation {
        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        validation
    }
}

impl TokenSigner for SigningKeyRing {
    fn sign_access(&self, claims: &AccessClaims) -> Result<String, TokenError> {
        self.sign(claims)
    }

    fn sign_m2m(&self, claims: &M2mClaims) -> Result<String, TokenError> {
        self.sign(claims)
    }

    fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let raw = self.verify_raw(token)?;

        let exp = raw
            .get("exp")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| TokenError::missing_claims("exp"))?;
        let now = Utc::now().timestamp();
        if now > exp + self.clock_tolerance {
            return Err(TokenError::expired(exp.to_string()));
        }

        let mode = raw.get("mode").and_then(|v| v.as_str()).unwrap_or("");
        if mode != "access" {
            return Err(TokenError::invalid(format!(
                "expected access token, got mode {:?}",
                mode
            )));
        }

        serde_json::from_value(raw)
            .map_err(|e| TokenError::invalid(format!("claims do not parse: {}", e)))
    }

    fn verify_raw(&self, token: &str) -> Result<serde_json::Value, TokenError> {
        let header = decode_header(token)
            .map_err(|e| TokenError::invalid(format!("malformed token: {}", e)))?;
        if header.alg != Algorithm::EdDSA {
            return Err(TokenError::invalid(format!(
                "unsupported algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| TokenError::invalid("token has no kid"))?;

        let ring = self.snapshot();
        let entry = ring
            .entries
            .iter()
            .find(|entry| entry.kid == kid)
            .ok_or_else(|| TokenError::key_id_not_found(&kid))?;

        let data = decode::<serde_json::Value>(token, &entry.decoding_key, &Self::raw_validation())
            .map_err(|e| TokenError::invalid(format!("verification failed: {}", e)))?;
        Ok(data.claims)
    }

    fn jwks(&self) -> serde_json::Value {
        let ring = self.snapshot();
        let keys: Vec<serde_json::Value> = ring
            .entries
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "kty": "OKP",
                    "crv": "Ed25519",
                    "x": URL_SAFE_NO_PAD.encode(entry.public),
                    "kid": entry.kid,
                    "alg": "EdDSA",
                    "use": "sig",
                })
            })
            .collect();
        serde_json::json!({ "keys": keys })
    }
}
