//! Port for the RBAC catalog and assignment tables.
//!
//! The RBAC service reads through a KV cache; this port is the SQL source
//! of truth behind cache misses and all catalog mutations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::error::StorageError;
use crate::core::rbac::{Permission, Role, UserRole};

/// Materialization result for one `(tenant, user, client)` triple.
#[derive(Debug, Clone, Default)]
pub struct ResolvedAccess {
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

/// Contract for RBAC persistence.
#[async_trait]
pub trait RbacRepository: Send + Sync {
    /// Resolve role names and permission names for a user, honoring
    /// assignment expiry (`expires_at IS NULL OR expires_at > now`).
    async fn resolve_access(
        &self,
        tenant_id: &str,
        user_id: &str,
        client_id: &str,
    ) -> Result<ResolvedAccess, StorageError>;

    async fn get_role(&self, role_id: &str) -> Result<Option<Role>, StorageError>;

    async fn list_roles(&self, tenant_id: &str) -> Result<Vec<Role>, StorageError>;

    async fn create_role(&self, role: &Role) -> Result<(), StorageError>;

    /// Update name/description of a role. System-role guards run upstream.
    async fn update_role(&self, role: &Role) -> Result<(), StorageError>;

    async fn delete_role(&self, role_id: &str) -> Result<bool, StorageError>;

    async fn get_permission(
        &self,
        permission_id: &str,
    ) -> Result<Option<Permission>, StorageError>;

    async fn list_permissions(&self, client_id: &str) -> Result<Vec<Permission>, StorageError>;

    async fn create_permission(&self, permission: &Permission) -> Result<(), StorageError>;

    async fn update_permission(&self, permission: &Permission) -> Result<(), StorageError>;

    async fn delete_permission(&self, permission_id: &str) -> Result<bool, StorageError>;

    async fn assign_role(&self, assignment: &UserRole) -> Result<(), StorageError>;

    async fn unassign_role(
        &self,
        tenant_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<bool, StorageError>;

    /// Role names currently effective for a user (privilege-escalation guard).
    async fn user_role_names(
        &self,
        tenant_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, StorageError>;

    async fn grant_permission_to_role(
        &self,
        role_id: &str,
        permission_id: &str,
    ) -> Result<(), StorageError>;

    async fn revoke_permission_from_role(
        &self,
        role_id: &str,
        permission_id: &str,
    ) -> Result<bool, StorageError>;

    /// Users holding a role, for targeted cache invalidation.
    async fn users_with_role(&self, role_id: &str) -> Result<Vec<String>, StorageError>;
}
