use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default cap on permissions embedded in a token.
pub const MAX_PERMISSIONS_IN_TOKEN: usize = 50;

/// Materialized permission list cached under
/// `rbac:permissions:<tenantId>:<userId>:<clientId>` with a 60 s TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedPermissions {
    pub permissions: Vec<String>,
    pub cached_at: DateTime<Utc>,
}

impl CachedPermissions {
    pub fn new(permissions: Vec<String>) -> Self {
        Self {
            permissions,
            cached_at: Utc::now(),
        }
    }
}

/// Roles and permissions destined for token claims.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedClaims {
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    /// True when the permission list was cut at the cap
    #[serde(skip)]
    pub truncated: bool,
}

impl EnrichedClaims {
    /// Build token claims from resolved roles and permissions: de-duplicate
    /// both lists (first occurrence wins, order preserved) and cap the
    /// permission list at `max_permissions`.
    pub fn build(
        roles: Vec<String>,
        permissions: Vec<String>,
        max_permissions: usize,
    ) -> Self {
        let roles = dedupe(roles);
        let mut permissions = dedupe(permissions);
        let truncated = permissions.len() > max_permissions;
        if truncated {
            permissions.truncate(max_permissions);
        }
        Self {
            roles,
            permissions,
            truncated,
        }
    }

    /// Set-union merge with app-supplied claims (provider callbacks may carry
    /// their own roles/permissions); RBAC-derived entries come first.
    pub fn merged_with(mut self, app_roles: Vec<String>, app_permissions: Vec<String>) -> Self {
        for role in app_roles {
            if !self.roles.contains(&role) {
                self.roles.push(role);
            }
        }
        for permission in app_permissions {
            if !self.permissions.contains(&permission) {
                self.permissions.push(permission);
            }
        }
        self
    }
}

fn dedupe(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
