// Tenant CRUD. Issuer-wide: guarded by the admin M2M scope, not by tenant
// resolution (a deployment must be able to create its first tenant).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::adapters::http::{
    dto::{CreateTenantRequest, SuccessResponse, UpdateTenantRequest},
    error::HttpError,
    state::AppState,
};
use crate::core::error::{CoreError, TenantError};
use crate::core::tenant::{Tenant, TenantStatus};

/// GET /tenants
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Tenant>>, HttpError> {
    Ok(Json(state.tenants.list().await.map_err(CoreError::from)?))
}

/// GET /tenants/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<Tenant>, HttpError> {
    let tenant = state
        .tenants
        .get(&tenant_id)
        .await
        .map_err(CoreError::from)?
        .ok_or_else(|| CoreError::from(TenantError::not_found(&tenant_id)))?;
    Ok(Json(tenant))
}

/// POST /tenants
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateTenantRequest>,
) -> Result<(StatusCode, Json<Tenant>), HttpError> {
    if state
        .tenants
        .get(&body.id)
        .await
        .map_err(CoreError::from)?
        .is_some()
    {
        return Err(HttpError::bad_request(
            "invalid_request",
            format!("tenant {} already exists", body.id),
        ));
    }
    if let Some(domain) = &body.domain {
        if state
            .tenants
            .get_by_domain(domain)
            .await
            .map_err(CoreError::from)?
            .is_some()
        {
            return Err(HttpError::bad_request(
                "invalid_request",
                format!("domain {} is already mapped to a tenant", domain),
            ));
        }
    }

    let mut tenant = Tenant::new(body.id, body.name);
    tenant.domain = body.domain;
    if let Some(branding) = body.branding {
        tenant.branding = branding;
    }
    if let Some(settings) = body.settings {
        tenant.settings = settings;
    }
    state.tenants.put(&tenant).await.map_err(CoreError::from)?;
    Ok((StatusCode::CREATED, Json(tenant)))
}

/// PUT /tenants/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Json(body): Json<UpdateTenantRequest>,
) -> Result<Json<Tenant>, HttpError> {
    let mut tenant = state
        .tenants
        .get(&tenant_id)
        .await
        .map_err(CoreError::from)?
        .ok_or_else(|| CoreError::from(TenantError::not_found(&tenant_id)))?;

    if let Some(name) = body.name {
        tenant.name = name;
    }
    if let Some(domain) = body.domain {
        tenant.domain = Some(domain);
    }
    if let Some(branding) = body.branding {
        tenant.branding = branding;
    }
    if let Some(settings) = body.settings {
        tenant.settings = settings;
    }
    if let Some(status) = body.status {
        tenant.status = status;
    }
    tenant.updated_at = Utc::now();

    state.tenants.put(&tenant).await.map_err(CoreError::from)?;
    Ok(Json(tenant))
}

/// DELETE /tenants/{id}: soft delete: flip status, keep the record.
pub async fn delete(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<SuccessResponse>, HttpError> {
    let mut tenant = state
        .tenants
        .get(&tenant_id)
        .await
        .map_err(CoreError::from)?
        .ok_or_else(|| CoreError::from(TenantError::not_found(&tenant_id)))?;

    tenant.status = TenantStatus::Deleted;
    tenant.updated_at = Utc::now();
    state.tenants.put(&tenant).await.map_err(CoreError::from)?;
    Ok(Json(SuccessResponse::ok()))
}
