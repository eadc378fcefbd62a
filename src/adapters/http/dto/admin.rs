// Admin surface DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::oauth::OAuthClient;
use crate::core::tenant::{Branding, TenantStatus};

/// `POST /tenants`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    pub id: String,
    pub name: String,
    pub domain: Option<String>,
    #[serde(default)]
    pub branding: Option<Branding>,
    #[serde(default)]
    pub settings: Option<serde_json::Value>,
}

/// `PUT /tenants/{id}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenantRequest {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub branding: Option<Branding>,
    pub settings: Option<serde_json::Value>,
    pub status: Option<TenantStatus>,
}

/// `POST /clients`: the secret arrives raw and is stored hashed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uris: Vec<String>,
    pub grant_types: Vec<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Client as exposed by the admin surface: never the secret hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientView {
    pub client_id: String,
    pub redirect_uris: Vec<String>,
    pub grant_types: Vec<String>,
    pub scopes: Vec<String>,
    pub tenant_id: String,
    pub confidential: bool,
}

impl From<&OAuthClient> for ClientView {
    fn from(client: &OAuthClient) -> Self {
        Self {
            client_id: client.client_id.clone(),
            redirect_uris: client.redirect_uris.clone(),
            grant_types: client
                .grant_types
                .iter()
                .map(|g| g.as_str().to_string())
                .collect(),
            scopes: client.scopes.clone(),
            tenant_id: client.tenant_id.clone(),
            confidential: client.is_confidential(),
        }
    }
}

/// `POST /rbac/admin/roles`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_system_role: bool,
}

/// `PUT /rbac/admin/roles/{id}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// `POST /rbac/admin/permissions`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermissionRequest {
    pub client_id: String,
    pub resource: String,
    pub action: String,
}

/// `POST /rbac/admin/assignments`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleRequest {
    pub user_id: String,
    pub role_id: String,
    pub assigned_by: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// `DELETE /rbac/admin/assignments`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignRoleRequest {
    pub user_id: String,
    pub role_id: String,
}

/// `POST /rbac/admin/roles/{id}/permissions`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantPermissionRequest {
    pub permission_id: String,
}

/// `POST /admin/sessions/cleanup`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupRequest {
    pub max_age_ms: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub sessions_removed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeSessionResponse {
    pub accounts_revoked: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeUserSessionsResponse {
    pub sessions_revoked: u64,
}

/// Pagination for admin listings.
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    #[serde(default)]
    pub active_only: Option<bool>,
}

/// `GET /providers`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderView {
    pub name: String,
}
