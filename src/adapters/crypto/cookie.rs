//! AEAD codec for session cookies and short-lived state blobs.
//!
//! ChaCha20-Poly1305 with the configured 256-bit secret. The wire format is
//! base64url(nonce || ciphertext || tag); the associated data binds each
//! blob to its use (cookie name), so blobs cannot be replayed across
//! purposes.
//!
//! # Design Principles
//!
//! - **No secret leakage**: Keys are never logged or exposed in errors
//! - **Absent, not broken**: Any open failure reads as "no state present"

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngExt;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, CHACHA20_POLY1305, NONCE_LEN};

use crate::core::error::StorageError;
use crate::core::usecases::ports::StateCodec;

/// Required secret size (256 bits).
pub const SECRET_LEN: usize = 32;

/// ChaCha20-Poly1305 implementation of the [`StateCodec`] port.
pub struct AeadCodec {
    key: LessSafeKey,
}

impl AeadCodec {
    /// Build a codec from the 32-byte session secret.
    pub fn new(secret: &[u8]) -> Result<Self, StorageError> {
        if secret.len() != SECRET_LEN {
            return Err(StorageError::unavailable(format!(
                "session secret must be {} bytes, got {}",
                SECRET_LEN,
                secret.len()
            )));
        }
        let unbound = UnboundKey::new(&CHACHA20_POLY1305, secret)
            .map_err(|_| StorageError::unavailable("invalid AEAD key material"))?;
        Ok(Self {
            key: LessSafeKey::new(unbound),
        })
    }
}

impl StateCodec for AeadCodec {
    fn seal(&self, aad: &str, plaintext: &[u8]) -> Result<String, StorageError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rng().fill(&mut nonce_bytes);
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let mut in_out = plaintext.to_vec();
        self.key
            .seal_in_place_append_tag(nonce, Aad::from(aad.as_bytes()), &mut in_out)
            .map_err(|_| StorageError::unavailable("AEAD seal failed"))?;

        let mut wire = Vec::with_capacity(NONCE_LEN + in_out.len());
        wire.extend_from_slice(&nonce_bytes);
        wire.extend_from_slice(&in_out);
        Ok(URL_SAFE_NO_PAD.encode(wire))
    }

    fn open(&self, aad: &str, blob: &str) -> Option<Vec<u8>> {
        let wire = URL_SAFE_NO_PAD.decode(blob).ok()?;
        if wire.len() <= NONCE_LEN {
            return None;
        }
        let (nonce_bytes, ciphertext) = wire.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes).ok()?;

        let mut in_out = ciphertext.to_vec();
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::from(aad.as_bytes()), &mut in_out)
            .ok()?;
        Some(plaintext.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> AeadCodec {
        AeadCodec::new(&[7u8; SECRET_LEN]).unwrap()
    }

    #[test]
    fn test_seal_open_round_trip() {
        let codec = codec();
        let blob = codec.seal("openauth.session", b"payload").unwrap();
        assert_eq!(
            codec.open("openauth.session", &blob).unwrap(),
            b"payload".to_vec()
        );
    }

    #[test]
    fn test_aad_binds_blob_to_purpose() {
        let codec = codec();
        let blob = codec.seal("openauth.session", b"payload").unwrap();
        assert!(codec.open("authz.state", &blob).is_none());
    }

    #[test]
    fn test_tampered_blob_reads_as_absent() {
        let codec = codec();
        let blob = codec.seal("openauth.session", b"payload").unwrap();
        let mut bytes = URL_SAFE_NO_PAD.decode(&blob).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = URL_SAFE_NO_PAD.encode(bytes);
        assert!(codec.open("openauth.session", &tampered).is_none());
    }

    #[test]
    fn test_garbage_blob_reads_as_absent() {
        let codec = codec();
        assert!(codec.open("openauth.session", "not-base64!!!").is_none());
        assert!(codec.open("openauth.session", "AAAA").is_none());
    }

    #[test]
    fn test_wrong_secret_size_rejected() {
        assert!(AeadCodec::new(&[0u8; 16]).is_err());
    }

    #[test]
    fn test_nonces_differ_between_seals() {
        let codec = codec();
        let a = codec.seal("n", b"same").unwrap();
        let b = codec.seal("n", b"same").unwrap();
        assert_ne!(a, b);
    }
}
