// OAuth client CRUD for the resolved tenant. Secrets arrive raw exactly
// once and are stored hashed; the API never returns them.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::adapters::http::{
    dto::{ClientView, CreateClientRequest, SuccessResponse},
    error::HttpError,
    state::AppState,
};
use crate::core::error::CoreError;
use crate::core::oauth::{GrantType, OAuthClient};
use crate::core::tenant::Tenant;

/// GET /clients
pub async fn list(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
) -> Result<Json<Vec<ClientView>>, HttpError> {
    let clients = state
        .clients
        .list(&tenant.id)
        .await
        .map_err(CoreError::from)?;
    Ok(Json(clients.iter().map(ClientView::from).collect()))
}

/// GET /clients/{clientId}
pub async fn get(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Path(client_id): Path<String>,
) -> Result<Json<ClientView>, HttpError> {
    let client = state
        .clients
        .get(&client_id)
        .await
        .map_err(CoreError::from)?
        .filter(|c| c.tenant_id == tenant.id)
        .ok_or_else(|| HttpError::not_found("client_not_found", "no such client"))?;
    Ok(Json(ClientView::from(&client)))
}

/// POST /clients
pub async fn create(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Json(body): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<ClientView>), HttpError> {
    let grant_types: Vec<GrantType> = body
        .grant_types
        .iter()
        .map(|name| {
            GrantType::parse(name).ok_or_else(|| {
                HttpError::bad_request("invalid_request", format!("unknown grant type: {}", name))
            })
        })
        .collect::<Result<_, _>>()?;

    let client_secret_hash = body
        .client_secret
        .as_deref()
        .map(|secret| state.secrets.hash(secret))
        .transpose()
        .map_err(CoreError::from)?;

    let client = OAuthClient {
        client_id: body.client_id,
        client_secret_hash,
        redirect_uris: body.redirect_uris,
        grant_types,
        scopes: body.scopes,
        tenant_id: tenant.id.clone(),
    };
    state.clients.put(&client).await.map_err(CoreError::from)?;
    Ok((StatusCode::CREATED, Json(ClientView::from(&client))))
}

/// DELETE /clients/{clientId}
pub async fn delete(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Path(client_id): Path<String>,
) -> Result<Json<SuccessResponse>, HttpError> {
    let owned = state
        .clients
        .get(&client_id)
        .await
        .map_err(CoreError::from)?
        .map(|c| c.tenant_id == tenant.id)
        .unwrap_or(false);
    if !owned {
        return Err(HttpError::not_found("client_not_found", "no such client"));
    }
    state
        .clients
        .delete(&client_id)
        .await
        .map_err(CoreError::from)?;
    Ok(Json(SuccessResponse::ok()))
}
