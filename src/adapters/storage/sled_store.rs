//! Durable ordered KV backend on sled.
//!
//! Values are stored in a JSON envelope carrying the absolute expiry so TTL
//! survives restarts. Sled keys are byte-ordered, which matches the string
//! ordering of the KV layout.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::StorageError;
use crate::core::usecases::ports::Storage;

#[derive(Serialize, Deserialize)]
struct Envelope {
    value: serde_json::Value,
    expires_at: Option<DateTime<Utc>>,
}

impl Envelope {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| now < at).unwrap_or(true)
    }
}

/// Sled-backed [`Storage`] implementation.
pub struct SledStorage {
    db: sled::Db,
}

impl SledStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = sled::open(path)
            .map_err(|e| StorageError::unavailable(format!("failed to open sled db: {}", e)))?;
        Ok(Self { db })
    }

    fn decode(bytes: &[u8]) -> Result<Envelope, StorageError> {
        serde_json::from_slice(bytes)
            .map_err(|e| StorageError::serialization(format!("corrupt envelope: {}", e)))
    }
}

#[async_trait]
impl Storage for SledStorage {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        let now = Utc::now();
        let bytes = self
            .db
            .get(key)
            .map_err(|e| StorageError::unavailable(format!("sled get failed: {}", e)))?;
        match bytes {
            Some(bytes) => {
                let envelope = Self::decode(&bytes)?;
                Ok(envelope.is_live(now).then_some(envelope.value))
            }
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Option<Duration>,
    ) -> Result<(), StorageError> {
        let envelope = Envelope {
            value,
            expires_at: ttl
                .map(|ttl| Utc::now() + chrono::Duration::milliseconds(ttl.as_millis() as i64)),
        };
        let bytes = serde_json::to_vec(&envelope)
            .map_err(|e| StorageError::serialization(format!("encode failed: {}", e)))?;
        self.db
            .insert(key, bytes)
            .map_err(|e| StorageError::unavailable(format!("sled insert failed: {}", e)))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        let now = Utc::now();
        let bytes = self
            .db
            .remove(key)
            .map_err(|e| StorageError::unavailable(format!("sled remove failed: {}", e)))?;
        match bytes {
            Some(bytes) => {
                let envelope = Self::decode(&bytes)?;
                Ok(envelope.is_live(now).then_some(envelope.value))
            }
            None => Ok(None),
        }
    }

    async fn scan(
        &self,
        prefix: &str,
    ) -> Result<Vec<(String, serde_json::Value)>, StorageError> {
        let now = Utc::now();
        let mut hits = Vec::new();
        for item in self.db.scan_prefix(prefix) {
            let (key, bytes) =
                item.map_err(|e| StorageError::unavailable(format!("sled scan failed: {}", e)))?;
            let envelope = Self::decode(&bytes)?;
            if envelope.is_live(now) {
                let key = String::from_utf8_lossy(&key).into_owned();
                hits.push((key, envelope.value));
            }
        }
        Ok(hits)
    }

    async fn purge_expired(&self) -> Result<usize, StorageError> {
        let now = Utc::now();
        let mut reaped = 0;
        for item in self.db.iter() {
            let (key, bytes) =
                item.map_err(|e| StorageError::unavailable(format!("sled iter failed: {}", e)))?;
            let live = serde_json::from_slice::<Envelope>(&bytes)
                .map(|envelope| envelope.is_live(now))
                .unwrap_or(false);
            if !live {
                self.db
                    .remove(&key)
                    .map_err(|e| StorageError::unavailable(format!("sled remove failed: {}", e)))?;
                reaped += 1;
            }
        }
        Ok(reaped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn open_temp() -> SledStorage {
        let dir = std::env::temp_dir().join(format!("authgrid-sled-{}", uuid::Uuid::new_v4()));
        SledStorage::open(dir).unwrap()
    }

    #[tokio::test]
    async fn test_round_trip_and_prefix_scan() {
        let storage = open_temp();
        storage.set("k:1", json!({"n": 1}), None).await.unwrap();
        storage.set("k:2", json!({"n": 2}), None).await.unwrap();
        storage.set("other", json!(0), None).await.unwrap();

        assert_eq!(storage.get("k:1").await.unwrap(), Some(json!({"n": 1})));
        let hits = storage.scan("k:").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, "k:1");
    }

    #[tokio::test]
    async fn test_ttl_survives_in_envelope() {
        let storage = open_temp();
        storage
            .set("gone", json!(1), Some(Duration::from_millis(1)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(storage.get("gone").await.unwrap(), None);
        assert_eq!(storage.purge_expired().await.unwrap(), 1);
    }
}
