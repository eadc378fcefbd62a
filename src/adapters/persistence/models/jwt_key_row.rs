/// Raw database row for persisted signing keys (`jwt_keys`).
///
/// The private seed is sealed with the state codec before it ever reaches
/// SQL; this row only sees ciphertext.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct JwtKeyRow {
    pub kid: String,
    pub alg: String,
    /// AEAD-sealed seed, base64 wire format
    pub sealed_seed: String,
    pub created_at: DateTime<Utc>,
}
