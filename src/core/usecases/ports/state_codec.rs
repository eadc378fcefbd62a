//! Port for sealing opaque browser state.
//!
//! Session cookies and short-lived authorization-state blobs cross the
//! browser as AEAD ciphertext. The associated-data argument binds a blob to
//! its use (the cookie name), so a session cookie cannot be replayed as an
//! authorization state.

use crate::core::error::StorageError;

/// Contract for the encrypted-state codec.
pub trait StateCodec: Send + Sync {
    /// Encrypt and encode `plaintext` for the wire.
    fn seal(&self, aad: &str, plaintext: &[u8]) -> Result<String, StorageError>;

    /// Decrypt a wire blob. Any integrity or format failure is `None` -
    /// "no state present", never an error.
    fn open(&self, aad: &str, blob: &str) -> Option<Vec<u8>>;
}
