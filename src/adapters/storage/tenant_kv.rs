//! KV-backed tenant store with an in-process cache.
//!
//! Tenant records are read on every request, so lookups go through a
//! `DashMap` cache in front of the KV. Mutations write through and drop the
//! cached entry. Custom-domain lookups use a secondary index key.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::core::error::StorageError;
use crate::core::tenant::Tenant;
use crate::core::usecases::ports::{storage_key, Storage, TenantStore};

const RECORD_PREFIX: &str = "tenants:record";
const DOMAIN_PREFIX: &str = "tenants:domain";

/// Cached tenant store over the shared KV.
pub struct KvTenantStore {
    storage: Arc<dyn Storage>,
    cache: DashMap<String, Tenant>,
}

impl KvTenantStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            cache: DashMap::new(),
        }
    }

    fn record_key(tenant_id: &str) -> String {
        storage_key(&[RECORD_PREFIX, tenant_id])
    }

    fn domain_key(domain: &str) -> String {
        storage_key(&[DOMAIN_PREFIX, domain])
    }

    fn decode(value: serde_json::Value) -> Result<Tenant, StorageError> {
        serde_json::from_value(value)
            .map_err(|e| StorageError::serialization(format!("corrupt tenant record: {}", e)))
    }
}

#[async_trait]
impl TenantStore for KvTenantStore {
    async fn get(&self, tenant_id: &str) -> Result<Option<Tenant>, StorageError> {
        if let Some(hit) = self.cache.get(tenant_id) {
            return Ok(Some(hit.clone()));
        }
        let value = self.storage.get(&Self::record_key(tenant_id)).await?;
        match value {
            Some(value) => {
                let tenant = Self::decode(value)?;
                self.cache.insert(tenant.id.clone(), tenant.clone());
                Ok(Some(tenant))
            }
            None => Ok(None),
        }
    }

    async fn get_by_domain(&self, domain: &str) -> Result<Option<Tenant>, StorageError> {
        let tenant_id = self.storage.get(&Self::domain_key(domain)).await?;
        match tenant_id.and_then(|v| v.as_str().map(str::to_string)) {
            Some(tenant_id) => self.get(&tenant_id).await,
            None => Ok(None),
        }
    }

    async fn put(&self, tenant: &Tenant) -> Result<(), StorageError> {
        let value = serde_json::to_value(tenant)
            .map_err(|e| StorageError::serialization(format!("encode tenant failed: {}", e)))?;
        self.storage
            .set(&Self::record_key(&tenant.id), value, None)
            .await?;
        if let Some(domain) = &tenant.domain {
            self.storage
                .set(
                    &Self::domain_key(domain),
                    serde_json::Value::String(tenant.id.clone()),
                    None,
                )
                .await?;
        }
        self.cache.remove(&tenant.id);
        Ok(())
    }

    async fn delete(&self, tenant_id: &str) -> Result<bool, StorageError> {
        let removed = self.storage.remove(&Self::record_key(tenant_id)).await?;
        if let Some(value) = &removed {
            if let Some(domain) = value.get("domain").and_then(|d| d.as_str()) {
                self.storage.remove(&Self::domain_key(domain)).await?;
            }
        }
        self.cache.remove(tenant_id);
        Ok(removed.is_some())
    }

    async fn list(&self) -> Result<Vec<Tenant>, StorageError> {
        let prefix = format!("{}:", RECORD_PREFIX);
        let hits = self.storage.scan(&prefix).await?;
        hits.into_iter().map(|(_, value)| Self::decode(value)).collect()
    }
}
