use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tenant-scoped role.
///
/// System roles (`is_system_role`) are immutable through the admin surface
/// and carry an assignment guard: a non-system assigner can only grant a
/// system role they already hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub is_system_role: bool,
    pub created_at: DateTime<Utc>,
}

impl Role {
    pub fn new(
        id: impl Into<String>,
        tenant_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            tenant_id: tenant_id.into(),
            name: name.into(),
            description: None,
            is_system_role: false,
            created_at: Utc::now(),
        }
    }
}

/// Role names are restricted to `[A-Za-z0-9_-]+`.
pub fn is_valid_role_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_name_charset() {
        assert!(is_valid_role_name("content-editor_2"));
        assert!(!is_valid_role_name(""));
        assert!(!is_valid_role_name("admin role"));
        assert!(!is_valid_role_name("admin:role"));
        assert!(!is_valid_role_name("rôle"));
    }
}
