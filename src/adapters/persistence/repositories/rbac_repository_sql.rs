/// SQL-backed implementation of the RBAC repository.
///
/// Implements operations against `rbac_roles`, `rbac_permissions`,
/// `rbac_user_roles`, and `rbac_role_permissions`. Assignment expiry is
/// honored in every resolution query; guard rules (system roles,
/// self-assignment) run upstream in the RBAC service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::adapters::persistence::database::Database;
use crate::adapters::persistence::models::{PermissionRow, RoleRow};
use crate::core::error::StorageError;
use crate::core::rbac::{Permission, Role, UserRole};
use crate::core::usecases::ports::{RbacRepository, ResolvedAccess};

pub struct RbacRepositorySql {
    db: Database,
}

impl RbacRepositorySql {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn query_failed(what: &str, e: sqlx::Error) -> StorageError {
        StorageError::unavailable(format!("{}: {}", what, e))
    }
}

#[async_trait]
impl RbacRepository for RbacRepositorySql {
    async fn resolve_access(
        &self,
        tenant_id: &str,
        user_id: &str,
        client_id: &str,
    ) -> Result<ResolvedAccess, StorageError> {
        const ROLES: &str = r#"
            SELECT r.name
            FROM rbac_user_roles ur
            JOIN rbac_roles r ON r.id = ur.role_id
            WHERE ur.user_id = $1 AND ur.tenant_id = $2
              AND (ur.expires_at IS NULL OR ur.expires_at > $3)
            ORDER BY r.name
        "#;
        const PERMISSIONS: &str = r#"
            SELECT DISTINCT p.name
            FROM rbac_user_roles ur
            JOIN rbac_role_permissions rp ON rp.role_id = ur.role_id
            JOIN rbac_permissions p ON p.id = rp.permission_id
            WHERE ur.user_id = $1 AND ur.tenant_id = $2
              AND p.client_id = $4
              AND (ur.expires_at IS NULL OR ur.expires_at > $3)
            ORDER BY p.name
        "#;

        let now = Utc::now();
        let roles: Vec<String> = sqlx::query_scalar(ROLES)
            .bind(user_id)
            .bind(tenant_id)
            .bind(now)
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to resolve roles", e))?;

        let permissions: Vec<String> = sqlx::query_scalar(PERMISSIONS)
            .bind(user_id)
            .bind(tenant_id)
            .bind(now)
            .bind(client_id)
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to resolve permissions", e))?;

        Ok(ResolvedAccess { roles, permissions })
    }

    async fn get_role(&self, role_id: &str) -> Result<Option<Role>, StorageError> {
        const QUERY: &str = r#"
            SELECT id, tenant_id, name, description, is_system_role, created_at
            FROM rbac_roles WHERE id = $1
        "#;

        let row = sqlx::query_as::<_, RoleRow>(QUERY)
            .bind(role_id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to query role", e))?;

        Ok(row.map(RoleRow::into_domain))
    }

    async fn list_roles(&self, tenant_id: &str) -> Result<Vec<Role>, StorageError> {
        const QUERY: &str = r#"
            SELECT id, tenant_id, name, description, is_system_role, created_at
            FROM rbac_roles WHERE tenant_id = $1 ORDER BY name
        "#;

        let rows = sqlx::query_as::<_, RoleRow>(QUERY)
            .bind(tenant_id)
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to list roles", e))?;

        Ok(rows.into_iter().map(RoleRow::into_domain).collect())
    }

    async fn create_role(&self, role: &Role) -> Result<(), StorageError> {
        const QUERY: &str = r#"
            INSERT INTO rbac_roles (id, tenant_id, name, description, is_system_role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
        "#;

        sqlx::query(QUERY)
            .bind(&role.id)
            .bind(&role.tenant_id)
            .bind(&role.name)
            .bind(&role.description)
            .bind(role.is_system_role)
            .bind(role.created_at)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to create role", e))?;

        Ok(())
    }

    async fn update_role(&self, role: &Role) -> Result<(), StorageError> {
        const QUERY: &str = r#"
            UPDATE rbac_roles SET name = $2, description = $3 WHERE id = $1
        "#;

        sqlx::query(QUERY)
            .bind(&role.id)
            .bind(&role.name)
            .bind(&role.description)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to update role", e))?;

        Ok(())
    }

    async fn delete_role(&self, role_id: &str) -> Result<bool, StorageError> {
        const DELETE_ASSIGNMENTS: &str = "DELETE FROM rbac_user_roles WHERE role_id = $1";
        const DELETE_GRANTS: &str = "DELETE FROM rbac_role_permissions WHERE role_id = $1";
        const DELETE_ROLE: &str = "DELETE FROM rbac_roles WHERE id = $1";

        sqlx::query(DELETE_ASSIGNMENTS)
            .bind(role_id)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to delete role assignments", e))?;
        sqlx::query(DELETE_GRANTS)
            .bind(role_id)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to delete role grants", e))?;
        let result = sqlx::query(DELETE_ROLE)
            .bind(role_id)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to delete role", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_permission(
        &self,
        permission_id: &str,
    ) -> Result<Option<Permission>, StorageError> {
        const QUERY: &str = r#"
            SELECT id, client_id, name, resource, action
            FROM rbac_permissions WHERE id = $1
        "#;

        let row = sqlx::query_as::<_, PermissionRow>(QUERY)
            .bind(permission_id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to query permission", e))?;

        Ok(row.map(PermissionRow::into_domain))
    }

    async fn list_permissions(&self, client_id: &str) -> Result<Vec<Permission>, StorageError> {
        const QUERY: &str = r#"
            SELECT id, client_id, name, resource, action
            FROM rbac_permissions WHERE client_id = $1 ORDER BY name
        "#;

        let rows = sqlx::query_as::<_, PermissionRow>(QUERY)
            .bind(client_id)
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to list permissions", e))?;

        Ok(rows.into_iter().map(PermissionRow::into_domain).collect())
    }

    async fn create_permission(&self, permission: &Permission) -> Result<(), StorageError> {
        const QUERY: &str = r#"
            INSERT INTO rbac_permissions (id, client_id, name, resource, action)
            VALUES ($1, $2, $3, $4, $5)
        "#;

        sqlx::query(QUERY)
            .bind(&permission.id)
            .bind(&permission.client_id)
            .bind(&permission.name)
            .bind(&permission.resource)
            .bind(&permission.action)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to create permission", e))?;

        Ok(())
    }

    async fn update_permission(&self, permission: &Permission) -> Result<(), StorageError> {
        const QUERY: &str = r#"
            UPDATE rbac_permissions
            SET name = $2, resource = $3, action = $4
            WHERE id = $1
        "#;

        sqlx::query(QUERY)
            .bind(&permission.id)
            .bind(&permission.name)
            .bind(&permission.resource)
            .bind(&permission.action)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to update permission", e))?;

        Ok(())
    }

    async fn delete_permission(&self, permission_id: &str) -> Result<bool, StorageError> {
        const DELETE_GRANTS: &str =
            "DELETE FROM rbac_role_permissions WHERE permission_id = $1";
        const DELETE_PERMISSION: &str = "DELETE FROM rbac_permissions WHERE id = $1";

        sqlx::query(DELETE_GRANTS)
            .bind(permission_id)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to delete permission grants", e))?;
        let result = sqlx::query(DELETE_PERMISSION)
            .bind(permission_id)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to delete permission", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn assign_role(&self, assignment: &UserRole) -> Result<(), StorageError> {
        const QUERY: &str = r#"
            INSERT INTO rbac_user_roles
            (user_id, role_id, tenant_id, assigned_at, assigned_by, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, role_id, tenant_id) DO UPDATE SET
                assigned_at = EXCLUDED.assigned_at,
                assigned_by = EXCLUDED.assigned_by,
                expires_at = EXCLUDED.expires_at
        "#;

        sqlx::query(QUERY)
            .bind(&assignment.user_id)
            .bind(&assignment.role_id)
            .bind(&assignment.tenant_id)
            .bind(assignment.assigned_at)
            .bind(&assignment.assigned_by)
            .bind(assignment.expires_at)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to assign role", e))?;

        Ok(())
    }

    async fn unassign_role(
        &self,
        tenant_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<bool, StorageError> {
        const QUERY: &str = r#"
            DELETE FROM rbac_user_roles
            WHERE tenant_id = $1 AND user_id = $2 AND role_id = $3
        "#;

        let result = sqlx::query(QUERY)
            .bind(tenant_id)
            .bind(user_id)
            .bind(role_id)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to unassign role", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn user_role_names(
        &self,
        tenant_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, StorageError> {
        const QUERY: &str = r#"
            SELECT r.name
            FROM rbac_user_roles ur
            JOIN rbac_roles r ON r.id = ur.role_id
            WHERE ur.tenant_id = $1 AND ur.user_id = $2
              AND (ur.expires_at IS NULL OR ur.expires_at > $3)
        "#;

        sqlx::query_scalar(QUERY)
            .bind(tenant_id)
            .bind(user_id)
            .bind(now)
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to query user role names", e))
    }

    async fn grant_permission_to_role(
        &self,
        role_id: &str,
        permission_id: &str,
    ) -> Result<(), StorageError> {
        const QUERY: &str = r#"
            INSERT INTO rbac_role_permissions (role_id, permission_id)
            VALUES ($1, $2)
            ON CONFLICT (role_id, permission_id) DO NOTHING
        "#;

        sqlx::query(QUERY)
            .bind(role_id)
            .bind(permission_id)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to grant permission", e))?;

        Ok(())
    }

    async fn revoke_permission_from_role(
        &self,
        role_id: &str,
        permission_id: &str,
    ) -> Result<bool, StorageError> {
        const QUERY: &str = r#"
            DELETE FROM rbac_role_permissions
            WHERE role_id = $1 AND permission_id = $2
        "#;

        let result = sqlx::query(QUERY)
            .bind(role_id)
            .bind(permission_id)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to revoke permission", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn users_with_role(&self, role_id: &str) -> Result<Vec<String>, StorageError> {
        const QUERY: &str = r#"
            SELECT DISTINCT user_id FROM rbac_user_roles WHERE role_id = $1
        "#;

        sqlx::query_scalar(QUERY)
            .bind(role_id)
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to enumerate role holders", e))
    }
}
