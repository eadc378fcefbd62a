// RBAC check endpoints for applications acting on behalf of a signed-in
// user. The caller authenticates with the user's access token; the user
// and tenant come from verified claims, never from the body.

use axum::{extract::State, Extension, Json};

use crate::adapters::http::{
    dto::{
        CheckBatchRequest, CheckBatchResponse, CheckPermissionRequest, CheckPermissionResponse,
        PermissionsResponse, RolesResponse,
    },
    error::HttpError,
    middleware::BearerToken,
    state::AppState,
};
use crate::core::token::AccessClaims;

async fn verified_claims(state: &AppState, token: &str) -> Result<AccessClaims, HttpError> {
    let claims = state
        .signer
        .verify_access(token)
        .map_err(|e| HttpError::unauthorized(e.code(), e.to_string()))?;
    if let Some(jti) = &claims.jti {
        if state.revocation.is_access_token_revoked(jti).await {
            return Err(HttpError::unauthorized("invalid_token", "token has been revoked"));
        }
    }
    Ok(claims)
}

/// POST /rbac/check
pub async fn check(
    State(state): State<AppState>,
    Extension(BearerToken(token)): Extension<BearerToken>,
    Json(body): Json<CheckPermissionRequest>,
) -> Result<Json<CheckPermissionResponse>, HttpError> {
    let claims = verified_claims(&state, &token).await?;
    let allowed = state
        .rbac
        .check_permission(&claims.tenant_id, &claims.sub, &body.client_id, &body.permission)
        .await?;
    Ok(Json(CheckPermissionResponse { allowed }))
}

/// POST /rbac/check/batch: resolves once for the whole list.
pub async fn check_batch(
    State(state): State<AppState>,
    Extension(BearerToken(token)): Extension<BearerToken>,
    Json(body): Json<CheckBatchRequest>,
) -> Result<Json<CheckBatchResponse>, HttpError> {
    let claims = verified_claims(&state, &token).await?;
    let results = state
        .rbac
        .check_permissions(&claims.tenant_id, &claims.sub, &body.client_id, &body.permissions)
        .await?;
    Ok(Json(CheckBatchResponse { results }))
}

/// GET /rbac/roles: the calling user's roles, resolved fresh.
pub async fn roles(
    State(state): State<AppState>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> Result<Json<RolesResponse>, HttpError> {
    let claims = verified_claims(&state, &token).await?;
    let client_id = claims.aud.clone().unwrap_or_default();
    let enriched = state
        .rbac
        .enrich_token_claims(&claims.tenant_id, &claims.sub, &client_id)
        .await?;
    Ok(Json(RolesResponse {
        roles: enriched.roles,
    }))
}

/// GET /rbac/permissions: the calling user's permissions, resolved fresh.
pub async fn permissions(
    State(state): State<AppState>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> Result<Json<PermissionsResponse>, HttpError> {
    let claims = verified_claims(&state, &token).await?;
    let client_id = claims.aud.clone().unwrap_or_default();
    let enriched = state
        .rbac
        .enrich_token_claims(&claims.tenant_id, &claims.sub, &client_id)
        .await?;
    Ok(Json(PermissionsResponse {
        permissions: enriched.permissions,
    }))
}
