// RBAC catalog administration: roles, permissions, grants, assignments.
// Guard rules (system roles, self-assignment) are enforced in the RBAC
// service; this layer only shapes requests and responses.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::adapters::http::{
    dto::{
        AssignRoleRequest, CreatePermissionRequest, CreateRoleRequest, GrantPermissionRequest,
        SuccessResponse, UnassignRoleRequest, UpdateRoleRequest,
    },
    error::HttpError,
    state::AppState,
};
use crate::core::error::{CoreError, RbacError};
use crate::core::rbac::{Permission, Role, UserRole};
use crate::core::tenant::Tenant;

/// GET /rbac/admin/roles
pub async fn list_roles(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
) -> Result<Json<Vec<Role>>, HttpError> {
    Ok(Json(state.rbac.list_roles(&tenant.id).await?))
}

/// POST /rbac/admin/roles
pub async fn create_role(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Json(body): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<Role>), HttpError> {
    let mut role = Role::new(Uuid::new_v4().to_string(), tenant.id.clone(), body.name);
    role.description = body.description;
    role.is_system_role = body.is_system_role;
    let role = state.rbac.create_role(role).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

/// PUT /rbac/admin/roles/{roleId}
pub async fn update_role(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Path(role_id): Path<String>,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<Json<Role>, HttpError> {
    let mut role = state
        .rbac
        .get_role(&role_id)
        .await?
        .filter(|r| r.tenant_id == tenant.id)
        .ok_or_else(|| CoreError::from(RbacError::role_not_found(&role_id)))?;

    if let Some(name) = body.name {
        role.name = name;
    }
    if let Some(description) = body.description {
        role.description = Some(description);
    }
    Ok(Json(state.rbac.update_role(role).await?))
}

/// DELETE /rbac/admin/roles/{roleId}
pub async fn delete_role(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Path(role_id): Path<String>,
) -> Result<Json<SuccessResponse>, HttpError> {
    let owned = state
        .rbac
        .get_role(&role_id)
        .await?
        .map(|r| r.tenant_id == tenant.id)
        .unwrap_or(false);
    if !owned {
        return Err(CoreError::from(RbacError::role_not_found(&role_id)).into());
    }
    state.rbac.delete_role(&role_id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /rbac/admin/roles/{roleId}/permissions
pub async fn grant_permission(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Path(role_id): Path<String>,
    Json(body): Json<GrantPermissionRequest>,
) -> Result<Json<SuccessResponse>, HttpError> {
    state
        .rbac
        .assign_permission_to_role(&tenant.id, &role_id, &body.permission_id)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

/// DELETE /rbac/admin/roles/{roleId}/permissions/{permissionId}
pub async fn revoke_permission(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Path((role_id, permission_id)): Path<(String, String)>,
) -> Result<Json<SuccessResponse>, HttpError> {
    let removed = state
        .rbac
        .revoke_permission_from_role(&tenant.id, &role_id, &permission_id)
        .await?;
    if !removed {
        return Err(CoreError::from(RbacError::permission_not_found(&permission_id)).into());
    }
    Ok(Json(SuccessResponse::ok()))
}

/// GET /rbac/admin/permissions/{clientId}
pub async fn list_permissions(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<Json<Vec<Permission>>, HttpError> {
    Ok(Json(state.rbac.list_permissions(&client_id).await?))
}

/// POST /rbac/admin/permissions
pub async fn create_permission(
    State(state): State<AppState>,
    Json(body): Json<CreatePermissionRequest>,
) -> Result<(StatusCode, Json<Permission>), HttpError> {
    let permission = Permission::new(
        Uuid::new_v4().to_string(),
        body.client_id,
        body.resource,
        body.action,
    );
    let permission = state.rbac.create_permission(permission).await?;
    Ok((StatusCode::CREATED, Json(permission)))
}

/// DELETE /rbac/admin/permissions/{permissionId}
pub async fn delete_permission(
    State(state): State<AppState>,
    Path(permission_id): Path<String>,
) -> Result<Json<SuccessResponse>, HttpError> {
    let removed = state.rbac.delete_permission(&permission_id).await?;
    if !removed {
        return Err(CoreError::from(RbacError::permission_not_found(&permission_id)).into());
    }
    Ok(Json(SuccessResponse::ok()))
}

/// POST /rbac/admin/assignments
pub async fn assign_role(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Json(body): Json<AssignRoleRequest>,
) -> Result<(StatusCode, Json<UserRole>), HttpError> {
    let assignment = state
        .rbac
        .assign_role_to_user(
            &tenant.id,
            &body.user_id,
            &body.role_id,
            &body.assigned_by,
            body.expires_at,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// DELETE /rbac/admin/assignments
pub async fn unassign_role(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Json(body): Json<UnassignRoleRequest>,
) -> Result<Json<SuccessResponse>, HttpError> {
    let removed = state
        .rbac
        .unassign_role_from_user(&tenant.id, &body.user_id, &body.role_id)
        .await?;
    if !removed {
        return Err(CoreError::from(RbacError::role_not_found(&body.role_id)).into());
    }
    Ok(Json(SuccessResponse::ok()))
}

/// GET /users/{userId}/roles: role names currently effective for a user.
pub async fn user_roles(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let enriched = state
        .rbac
        .enrich_token_claims(&tenant.id, &user_id, "")
        .await?;
    Ok(Json(serde_json::json!({ "roles": enriched.roles })))
}
