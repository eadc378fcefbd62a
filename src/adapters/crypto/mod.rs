// Cryptographic adapters: the AEAD state codec, the Ed25519 signing-key
// ring, and client-secret hashing.

pub mod cookie;
pub mod keys;
pub mod secret;

pub use cookie::{AeadCodec, SECRET_LEN};
pub use keys::{SigningKeyRing, SEED_LEN};
pub use secret::ClientSecretHasher;
