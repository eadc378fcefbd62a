//! Port for tenant record access.
//!
//! Read on every request by the resolver middleware; mutated only through
//! the admin surface. Adapters are expected to cache aggressively.

use async_trait::async_trait;

use crate::core::error::StorageError;
use crate::core::tenant::Tenant;

/// Contract for tenant lookup and lifecycle.
#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Fetch a tenant by id.
    async fn get(&self, tenant_id: &str) -> Result<Option<Tenant>, StorageError>;

    /// Fetch a tenant by its custom domain.
    async fn get_by_domain(&self, domain: &str) -> Result<Option<Tenant>, StorageError>;

    /// Create or replace a tenant record.
    async fn put(&self, tenant: &Tenant) -> Result<(), StorageError>;

    /// Soft-delete: callers flip the status; this removes the record and its
    /// domain index entry.
    async fn delete(&self, tenant_id: &str) -> Result<bool, StorageError>;

    /// Enumerate all tenants (admin surface only).
    async fn list(&self) -> Result<Vec<Tenant>, StorageError>;
}
