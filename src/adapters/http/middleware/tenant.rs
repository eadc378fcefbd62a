// Tenant resolution middleware

use axum::{
    extract::{Request, State},
    http::header::HOST,
    middleware::Next,
    response::Response,
};

use crate::adapters::http::{error::HttpError, state::AppState};
use crate::adapters::storage::ScopedStorage;
use crate::core::error::TenantError;
use crate::core::tenant::{resolve_hint, RequestHints};

/// Resolve the request to a tenant, attach the tenant record, its resolved
/// theme, and a tenant-scoped storage façade to the request extensions.
///
/// Resolution order: custom-domain map, host suffix against the base
/// domain, path prefix, header, query; then the tenant store's own domain
/// index as a last resort. No match is a 404 `tenant_not_found`.
pub async fn resolve_tenant(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let header_value = request
        .headers()
        .get(state.resolver.header_name.as_str())
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let query_value = request
        .uri()
        .query()
        .and_then(|query| query_param(query, &state.resolver.query_param));

    let hints = RequestHints {
        host: host.as_deref(),
        path: request.uri().path(),
        header_value: header_value.as_deref(),
        query_value: query_value.as_deref(),
    };

    let tenant = match resolve_hint(&state.resolver, &hints) {
        Some(hint) => state
            .tenants
            .get(hint.tenant_id())
            .await
            .map_err(crate::core::error::CoreError::from)?,
        None => match &host {
            Some(host) => {
                let bare = host.split(':').next().unwrap_or(host);
                state
                    .tenants
                    .get_by_domain(bare)
                    .await
                    .map_err(crate::core::error::CoreError::from)?
            }
            None => None,
        },
    };

    let tenant = tenant.filter(|t| t.is_active()).ok_or_else(|| {
        HttpError::from(crate::core::error::CoreError::Tenant(TenantError::not_found(
            host.as_deref().unwrap_or("request"),
        )))
    })?;

    let theme = state.theme.resolve(Some(&tenant)).await;
    let scoped = ScopedStorage::new(state.storage.clone(), &tenant.id);

    request.extensions_mut().insert(tenant);
    request.extensions_mut().insert(theme);
    request.extensions_mut().insert(scoped);

    Ok(next.run(request).await)
}

fn query_param(query: &str, name: &str) -> Option<String> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(query)
        .ok()?
        .into_iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
}
