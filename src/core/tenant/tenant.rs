use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a tenant.
///
/// Suspended and deleted tenants still exist as records (soft delete) but
/// do not resolve for incoming requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Suspended,
    Deleted,
}

/// Per-tenant branding knobs consumed by the theme resolver and the
/// server-rendered pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
    /// Named theme; feeds the top of the theme priority chain
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub logo_light: Option<String>,
    #[serde(default)]
    pub logo_dark: Option<String>,
    #[serde(default)]
    pub favicon: Option<String>,
    #[serde(default)]
    pub custom_css: Option<String>,
}

/// An isolated customer realm with its own clients, users, roles, and branding.
///
/// Invariants: `id` is unique; `domain`, when set, is unique across tenants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    /// Explicit custom domain, if this tenant is served on one
    #[serde(default)]
    pub domain: Option<String>,
    pub name: String,
    pub status: TenantStatus,
    #[serde(default)]
    pub branding: Branding,
    /// Free-form tenant policy bag (session TTL overrides and the like)
    #[serde(default)]
    pub settings: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Construct an active tenant with empty branding and settings.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            domain: None,
            name: name.into(),
            status: TenantStatus::Active,
            branding: Branding::default(),
            settings: serde_json::Value::Null,
            created_at: now,
            updated_at: now,
        }
    }

    /// A tenant resolves for requests only while active.
    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tenant_is_active() {
        let tenant = Tenant::new("acme", "Acme Corp");
        assert!(tenant.is_active());
        assert_eq!(tenant.branding, Branding::default());
    }

    #[test]
    fn test_suspended_tenant_does_not_resolve() {
        let mut tenant = Tenant::new("acme", "Acme Corp");
        tenant.status = TenantStatus::Suspended;
        assert!(!tenant.is_active());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&TenantStatus::Suspended).unwrap();
        assert_eq!(json, r#""suspended""#);
    }
}
