// Admin routes (require an M2M bearer token with the admin scope).

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::adapters::http::handlers::admin;
use crate::adapters::http::state::AppState;

/// Tenant-scoped admin routes: clients, RBAC catalog, session inspection.
pub fn tenant_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/clients", get(admin::clients::list).post(admin::clients::create))
        .route(
            "/clients/{clientId}",
            get(admin::clients::get).delete(admin::clients::delete),
        )
        .route(
            "/rbac/admin/roles",
            get(admin::rbac_admin::list_roles).post(admin::rbac_admin::create_role),
        )
        .route(
            "/rbac/admin/roles/{roleId}",
            put(admin::rbac_admin::update_role).delete(admin::rbac_admin::delete_role),
        )
        .route(
            "/rbac/admin/roles/{roleId}/permissions",
            post(admin::rbac_admin::grant_permission),
        )
        .route(
            "/rbac/admin/roles/{roleId}/permissions/{permissionId}",
            delete(admin::rbac_admin::revoke_permission),
        )
        .route(
            "/rbac/admin/permissions",
            post(admin::rbac_admin::create_permission),
        )
        .route(
            "/rbac/admin/permissions/{permissionId}",
            delete(admin::rbac_admin::delete_permission),
        )
        .route(
            "/rbac/admin/permissions/client/{clientId}",
            get(admin::rbac_admin::list_permissions),
        )
        .route(
            "/rbac/admin/assignments",
            post(admin::rbac_admin::assign_role).delete(admin::rbac_admin::unassign_role),
        )
        .route("/users/{userId}/roles", get(admin::rbac_admin::user_roles))
        .route("/admin/sessions", get(admin::sessions_admin::list_tenant_sessions))
        .route("/admin/sessions/stats", get(admin::sessions_admin::stats))
        .route("/admin/sessions/cleanup", post(admin::sessions_admin::cleanup))
        .route(
            "/admin/sessions/{sessionId}",
            delete(admin::sessions_admin::revoke_session),
        )
        .route(
            "/admin/users/{userId}/sessions",
            get(admin::sessions_admin::list_user_sessions)
                .delete(admin::sessions_admin::revoke_all_user_sessions),
        )
        .route(
            "/admin/users/{userId}/sessions/{sessionId}",
            delete(admin::sessions_admin::revoke_user_session),
        )
}

/// Issuer-wide admin routes: tenant CRUD and provider listing. These run
/// without tenant resolution so a fresh deployment can create its first
/// tenant.
pub fn issuer_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/tenants", get(admin::tenants::list).post(admin::tenants::create))
        .route(
            "/tenants/{tenantId}",
            get(admin::tenants::get)
                .put(admin::tenants::update)
                .delete(admin::tenants::delete),
        )
        .route("/providers", get(admin::providers::list))
}
