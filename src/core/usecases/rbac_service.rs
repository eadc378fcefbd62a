//! Use case: role-based access control.
//!
//! Permission checks are cache-first: materialized lists live in the KV
//! under `rbac:permissions:<tenantId>:<userId>:<clientId>` with a 60 s TTL.
//! Catalog mutations invalidate affected cache keys; invalidation failures
//! degrade to a warning because entries re-resolve at TTL expiry anyway.
//!
//! Guard rules enforced here, not in the repository:
//! - no self-assignment of roles
//! - a system role can only be granted by someone who already holds it
//! - system roles cannot be updated or deleted
//! - role names are validated

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::core::error::{CoreError, RbacError, StorageError};
use crate::core::rbac::{
    is_valid_role_name, CachedPermissions, EnrichedClaims, Permission, Role, UserRole,
    MAX_PERMISSIONS_IN_TOKEN,
};
use crate::core::usecases::ports::{storage_key, Clock, RbacRepository, Storage};

/// RBAC tuning; defaults match the issuer contract.
#[derive(Debug, Clone)]
pub struct RbacConfig {
    /// Permission-cache TTL
    pub cache_ttl: Duration,
    /// Cap on permissions embedded in a token
    pub max_permissions_in_token: usize,
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(60),
            max_permissions_in_token: MAX_PERMISSIONS_IN_TOKEN,
        }
    }
}

pub struct RbacService {
    storage: Arc<dyn Storage>,
    repo: Arc<dyn RbacRepository>,
    clock: Arc<dyn Clock>,
    config: RbacConfig,
}

impl RbacService {
    pub fn new(
        storage: Arc<dyn Storage>,
        repo: Arc<dyn RbacRepository>,
        clock: Arc<dyn Clock>,
        config: RbacConfig,
    ) -> Self {
        Self {
            storage,
            repo,
            clock,
            config,
        }
    }

    fn cache_key(tenant_id: &str, user_id: &str, client_id: &str) -> String {
        storage_key(&["rbac", "permissions", tenant_id, user_id, client_id])
    }

    /// Materialized permission list for a triple, cache-first.
    async fn resolve_permissions(
        &self,
        tenant_id: &str,
        user_id: &str,
        client_id: &str,
    ) -> Result<Vec<String>, CoreError> {
        let key = Self::cache_key(tenant_id, user_id, client_id);
        if let Some(value) = self.storage.get(&key).await? {
            if let Ok(cached) = serde_json::from_value::<CachedPermissions>(value) {
                return Ok(cached.permissions);
            }
        }

        let access = self.repo.resolve_access(tenant_id, user_id, client_id).await?;
        let cached = CachedPermissions::new(access.permissions.clone());
        let value = serde_json::to_value(&cached)
            .map_err(|e| StorageError::serialization(format!("encode cache failed: {}", e)))?;
        if let Err(e) = self
            .storage
            .set(&key, value, Some(self.config.cache_ttl))
            .await
        {
            warn!(tenant_id, user_id, error = %e, "permission cache write failed");
        }
        Ok(access.permissions)
    }

    /// Cached single-permission check.
    pub async fn check_permission(
        &self,
        tenant_id: &str,
        user_id: &str,
        client_id: &str,
        permission: &str,
    ) -> Result<bool, CoreError> {
        let permissions = self.resolve_permissions(tenant_id, user_id, client_id).await?;
        Ok(permissions.iter().any(|p| p == permission))
    }

    /// Batch check; resolves once.
    pub async fn check_permissions(
        &self,
        tenant_id: &str,
        user_id: &str,
        client_id: &str,
        wanted: &[String],
    ) -> Result<HashMap<String, bool>, CoreError> {
        let permissions = self.resolve_permissions(tenant_id, user_id, client_id).await?;
        Ok(wanted
            .iter()
            .map(|p| (p.clone(), permissions.contains(p)))
            .collect())
    }

    /// Roles and permissions for token claims: de-duplicated, permission
    /// list capped, truncation logged.
    pub async fn enrich_token_claims(
        &self,
        tenant_id: &str,
        user_id: &str,
        client_id: &str,
    ) -> Result<EnrichedClaims, CoreError> {
        let access = self.repo.resolve_access(tenant_id, user_id, client_id).await?;
        let claims = EnrichedClaims::build(
            access.roles,
            access.permissions,
            self.config.max_permissions_in_token,
        );
        if claims.truncated {
            warn!(
                tenant_id,
                user_id,
                cap = self.config.max_permissions_in_token,
                "permission list truncated for token claims"
            );
        }
        Ok(claims)
    }

    /// Drop the cached permissions for one `(tenant, user)` across all
    /// clients.
    pub async fn invalidate_user(&self, tenant_id: &str, user_id: &str) {
        let prefix = format!("rbac:permissions:{}:{}:", tenant_id, user_id);
        match self.storage.scan(&prefix).await {
            Ok(hits) => {
                for (key, _) in hits {
                    if let Err(e) = self.storage.remove(&key).await {
                        warn!(tenant_id, user_id, error = %e, "cache invalidation failed");
                    }
                }
            }
            Err(e) => warn!(tenant_id, user_id, error = %e, "cache invalidation scan failed"),
        }
    }

    pub async fn get_role(&self, role_id: &str) -> Result<Option<Role>, CoreError> {
        Ok(self.repo.get_role(role_id).await?)
    }

    pub async fn list_roles(&self, tenant_id: &str) -> Result<Vec<Role>, CoreError> {
        Ok(self.repo.list_roles(tenant_id).await?)
    }

    pub async fn create_role(&self, role: Role) -> Result<Role, CoreError> {
        if !is_valid_role_name(&role.name) {
            return Err(RbacError::invalid_role_name(&role.name).into());
        }
        self.repo.create_role(&role).await?;
        Ok(role)
    }

    pub async fn update_role(&self, role: Role) -> Result<Role, CoreError> {
        if !is_valid_role_name(&role.name) {
            return Err(RbacError::invalid_role_name(&role.name).into());
        }
        let existing = self
            .repo
            .get_role(&role.id)
            .await?
            .ok_or_else(|| RbacError::role_not_found(&role.id))?;
        if existing.is_system_role {
            return Err(RbacError::cannot_modify_system_role(&existing.name).into());
        }
        self.repo.update_role(&role).await?;
        Ok(role)
    }

    pub async fn delete_role(&self, role_id: &str) -> Result<(), CoreError> {
        let existing = self
            .repo
            .get_role(role_id)
            .await?
            .ok_or_else(|| RbacError::role_not_found(role_id))?;
        if existing.is_system_role {
            return Err(RbacError::cannot_modify_system_role(&existing.name).into());
        }

        // Invalidate holders before the rows disappear.
        let holders = self.repo.users_with_role(role_id).await.unwrap_or_default();
        self.repo.delete_role(role_id).await?;
        for user_id in holders {
            self.invalidate_user(&existing.tenant_id, &user_id).await;
        }
        Ok(())
    }

    /// Assign a role, enforcing the self-assignment and system-role guards.
    pub async fn assign_role_to_user(
        &self,
        tenant_id: &str,
        user_id: &str,
        role_id: &str,
        assigned_by: &str,
        expires_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<UserRole, CoreError> {
        if user_id == assigned_by {
            return Err(RbacError::self_assignment(user_id).into());
        }

        let role = self
            .repo
            .get_role(role_id)
            .await?
            .ok_or_else(|| RbacError::role_not_found(role_id))?;

        if role.is_system_role {
            let assigner_roles = self
                .repo
                .user_role_names(tenant_id, assigned_by, self.clock.now())
                .await?;
            if !assigner_roles.contains(&role.name) {
                return Err(RbacError::privilege_escalation(&role.name).into());
            }
        }

        let assignment = UserRole {
            user_id: user_id.to_string(),
            role_id: role_id.to_string(),
            tenant_id: tenant_id.to_string(),
            assigned_at: self.clock.now(),
            assigned_by: assigned_by.to_string(),
            expires_at,
        };
        self.repo.assign_role(&assignment).await?;
        self.invalidate_user(tenant_id, user_id).await;
        Ok(assignment)
    }

    pub async fn unassign_role_from_user(
        &self,
        tenant_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<bool, CoreError> {
        let removed = self.repo.unassign_role(tenant_id, user_id, role_id).await?;
        if removed {
            self.invalidate_user(tenant_id, user_id).await;
        }
        Ok(removed)
    }

    pub async fn list_permissions(&self, client_id: &str) -> Result<Vec<Permission>, CoreError> {
        Ok(self.repo.list_permissions(client_id).await?)
    }

    pub async fn create_permission(&self, permission: Permission) -> Result<Permission, CoreError> {
        self.repo.create_permission(&permission).await?;
        Ok(permission)
    }

    pub async fn update_permission(&self, permission: Permission) -> Result<Permission, CoreError> {
        let exists = self.repo.get_permission(&permission.id).await?;
        if exists.is_none() {
            return Err(RbacError::permission_not_found(&permission.id).into());
        }
        self.repo.update_permission(&permission).await?;
        Ok(permission)
    }

    pub async fn delete_permission(&self, permission_id: &str) -> Result<bool, CoreError> {
        Ok(self.repo.delete_permission(permission_id).await?)
    }

    /// Grant a permission to a role, invalidating every holder's cache.
    /// Enumeration failure degrades to a warning: entries re-resolve at
    /// TTL expiry.
    pub async fn assign_permission_to_role(
        &self,
        tenant_id: &str,
        role_id: &str,
        permission_id: &str,
    ) -> Result<(), CoreError> {
        self.repo
            .grant_permission_to_role(role_id, permission_id)
            .await?;

        match self.repo.users_with_role(role_id).await {
            Ok(holders) => {
                for user_id in holders {
                    self.invalidate_user(tenant_id, &user_id).await;
                }
            }
            Err(e) => {
                warn!(role_id, error = %e, "holder enumeration failed; caches expire by TTL");
            }
        }
        Ok(())
    }

    pub async fn revoke_permission_from_role(
        &self,
        tenant_id: &str,
        role_id: &str,
        permission_id: &str,
    ) -> Result<bool, CoreError> {
        let removed = self
            .repo
            .revoke_permission_from_role(role_id, permission_id)
            .await?;
        if removed {
            match self.repo.users_with_role(role_id).await {
                Ok(holders) => {
                    for user_id in holders {
                        self.invalidate_user(tenant_id, &user_id).await;
                    }
                }
                Err(e) => {
                    warn!(role_id, error = %e, "holder enumeration failed; caches expire by TTL");
                }
            }
        }
        Ok(removed)
    }
}
