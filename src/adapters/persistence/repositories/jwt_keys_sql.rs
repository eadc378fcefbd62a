/// SQL-backed persistence for the signing-key ring (`jwt_keys`).
///
/// Seeds arrive already sealed by the state codec; this repository never
/// sees plaintext key material.

use chrono::Utc;

use crate::adapters::persistence::database::Database;
use crate::adapters::persistence::models::JwtKeyRow;
use crate::core::error::StorageError;

pub struct JwtKeysSql {
    db: Database,
}

impl JwtKeysSql {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Load every key, oldest first; the last one becomes the signer.
    pub async fn load_all(&self) -> Result<Vec<JwtKeyRow>, StorageError> {
        const QUERY: &str = r#"
            SELECT kid, alg, sealed_seed, created_at
            FROM jwt_keys ORDER BY created_at ASC
        "#;

        sqlx::query_as::<_, JwtKeyRow>(QUERY)
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| StorageError::unavailable(format!("failed to load jwt keys: {}", e)))
    }

    /// Persist a newly generated key.
    pub async fn insert(&self, kid: &str, alg: &str, sealed_seed: &str) -> Result<(), StorageError> {
        const QUERY: &str = r#"
            INSERT INTO jwt_keys (kid, alg, sealed_seed, created_at)
            VALUES ($1, $2, $3, $4)
        "#;

        sqlx::query(QUERY)
            .bind(kid)
            .bind(alg)
            .bind(sealed_seed)
            .bind(Utc::now())
            .execute(self.db.pool())
            .await
            .map_err(|e| StorageError::unavailable(format!("failed to insert jwt key: {}", e)))?;

        Ok(())
    }
}
