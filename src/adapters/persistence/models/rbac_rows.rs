/// Raw database rows for the RBAC catalog
/// (`rbac_roles`, `rbac_permissions`, `rbac_user_roles`).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::core::rbac::{Permission, Role, UserRole};

#[derive(Debug, Clone, FromRow)]
pub struct RoleRow {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_system_role: bool,
    pub created_at: DateTime<Utc>,
}

impl RoleRow {
    pub fn into_domain(self) -> Role {
        Role {
            id: self.id,
            tenant_id: self.tenant_id,
            name: self.name,
            description: self.description,
            is_system_role: self.is_system_role,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PermissionRow {
    pub id: String,
    pub client_id: String,
    pub name: String,
    pub resource: String,
    pub action: String,
}

impl PermissionRow {
    pub fn into_domain(self) -> Permission {
        Permission {
            id: self.id,
            client_id: self.client_id,
            name: self.name,
            resource: self.resource,
            action: self.action,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRoleRow {
    pub user_id: String,
    pub role_id: String,
    pub tenant_id: String,
    pub assigned_at: DateTime<Utc>,
    pub assigned_by: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl UserRoleRow {
    pub fn into_domain(self) -> UserRole {
        UserRole {
            user_id: self.user_id,
            role_id: self.role_id,
            tenant_id: self.tenant_id,
            assigned_at: self.assigned_at,
            assigned_by: self.assigned_by,
            expires_at: self.expires_at,
        }
    }
}
