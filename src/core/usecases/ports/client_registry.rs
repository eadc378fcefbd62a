//! Port for the OAuth client registry.

use async_trait::async_trait;

use crate::core::error::StorageError;
use crate::core::oauth::OAuthClient;

/// Contract for client lookup and admin CRUD.
#[async_trait]
pub trait ClientRegistry: Send + Sync {
    /// Fetch a client by id, any tenant. The caller enforces tenant match.
    async fn get(&self, client_id: &str) -> Result<Option<OAuthClient>, StorageError>;

    /// Create or replace a client registration.
    async fn put(&self, client: &OAuthClient) -> Result<(), StorageError>;

    /// Remove a client registration.
    async fn delete(&self, client_id: &str) -> Result<bool, StorageError>;

    /// All clients of one tenant.
    async fn list(&self, tenant_id: &str) -> Result<Vec<OAuthClient>, StorageError>;
}
