//! Tenant-scoped storage façade.
//!
//! Wraps any [`Storage`] and prefixes every key with `tenant:{id}:`, so a
//! leaf handed this façade cannot read or write another tenant's keys.
//! Attached to the request by the tenant middleware.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::core::error::StorageError;
use crate::core::usecases::ports::Storage;

/// Per-tenant view over a shared storage backend.
#[derive(Clone)]
pub struct ScopedStorage {
    inner: Arc<dyn Storage>,
    prefix: String,
}

impl ScopedStorage {
    pub fn new(inner: Arc<dyn Storage>, tenant_id: &str) -> Self {
        Self {
            inner,
            prefix: format!("tenant:{}:", tenant_id),
        }
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait]
impl Storage for ScopedStorage {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        self.inner.get(&self.scoped(key)).await
    }

    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Option<Duration>,
    ) -> Result<(), StorageError> {
        self.inner.set(&self.scoped(key), value, ttl).await
    }

    async fn remove(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        self.inner.remove(&self.scoped(key)).await
    }

    async fn scan(
        &self,
        prefix: &str,
    ) -> Result<Vec<(String, serde_json::Value)>, StorageError> {
        let hits = self.inner.scan(&self.scoped(prefix)).await?;
        Ok(hits
            .into_iter()
            .map(|(key, value)| {
                let stripped = key
                    .strip_prefix(&self.prefix)
                    .map(str::to_string)
                    .unwrap_or(key);
                (stripped, value)
            })
            .collect())
    }

    async fn purge_expired(&self) -> Result<usize, StorageError> {
        self.inner.purge_expired().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryStorage;
    use serde_json::json;

    #[tokio::test]
    async fn test_scoped_keys_cannot_cross_tenants() {
        let shared: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let acme = ScopedStorage::new(shared.clone(), "acme");
        let globex = ScopedStorage::new(shared.clone(), "globex");

        acme.set("session:browser:s1", json!("acme-data"), None)
            .await
            .unwrap();

        assert_eq!(globex.get("session:browser:s1").await.unwrap(), None);
        assert!(globex.scan("session:").await.unwrap().is_empty());

        // The shared view shows the fully-prefixed key.
        assert_eq!(
            shared
                .get("tenant:acme:session:browser:s1")
                .await
                .unwrap(),
            Some(json!("acme-data"))
        );
    }

    #[tokio::test]
    async fn test_scan_strips_tenant_prefix() {
        let shared: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let acme = ScopedStorage::new(shared, "acme");
        acme.set("rbac:permissions:u1", json!(1), None).await.unwrap();

        let hits = acme.scan("rbac:").await.unwrap();
        assert_eq!(hits[0].0, "rbac:permissions:u1");
    }
}
