// Router definition and assembly

use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
use tower_http::trace::TraceLayer;

use crate::adapters::http::middleware::{attach_session, m2m_admin_auth, resolve_tenant};
use crate::adapters::http::state::AppState;

use super::admin_router::{issuer_admin_routes, tenant_admin_routes};
use super::public_router::{oauth_routes, rbac_routes, session_routes, well_known_routes};

/// Build the complete HTTP router with all routes and middleware.
///
/// Middleware order (outermost first): tenant resolution, then session
/// attachment, then route handlers. Admin surfaces additionally verify an
/// M2M bearer token; issuer-wide admin (tenant CRUD) skips tenant
/// resolution entirely. Health routes carry no middleware.
pub fn create_router(state: AppState) -> Router {
    let public: Router<AppState> = Router::new()
        .merge(oauth_routes())
        .merge(well_known_routes())
        .merge(session_routes())
        .merge(rbac_routes());
    let public: Router<AppState> = public.layer(from_fn_with_state(state.clone(), attach_session));
    let public: Router<AppState> = public.layer(from_fn_with_state(state.clone(), resolve_tenant));

    let tenant_admin = tenant_admin_routes()
        .layer(from_fn_with_state(state.clone(), m2m_admin_auth))
        .layer(from_fn_with_state(state.clone(), resolve_tenant));

    let issuer_admin =
        issuer_admin_routes().layer(from_fn_with_state(state.clone(), m2m_admin_auth));

    Router::new()
        .merge(public)
        .merge(tenant_admin)
        .merge(issuer_admin)
        .nest("/health", health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check routes (no authentication required)
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(readiness_check))
}

/// Liveness probe - always returns 200 if service is running
async fn health_check() -> &'static str {
    "OK"
}

/// Readiness probe - verifies the SQL mirror answers when one is wired
async fn readiness_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<serde_json::Value>, crate::adapters::http::error::HttpError> {
    if let Some(db) = &state.db {
        db.ping()
            .await
            .map_err(|e| crate::adapters::http::error::HttpError::internal(e.to_string()))?;
    }
    Ok(Json(serde_json::json!({ "ready": true })))
}
