use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Join row: a role granted to a user, with provenance and optional expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRole {
    pub user_id: String,
    pub role_id: String,
    pub tenant_id: String,
    pub assigned_at: DateTime<Utc>,
    pub assigned_by: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl UserRole {
    /// An assignment counts only while unexpired.
    pub fn is_effective(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp > now).unwrap_or(true)
    }
}

/// Join row: a permission granted to a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePermission {
    pub role_id: String,
    pub permission_id: String,
}
