// Admin session inspection and revocation. SQL-backed; every query is
// scoped to the resolved tenant.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use crate::adapters::http::{
    dto::{
        AccountView, CleanupRequest, CleanupResponse, PageQuery, RevokeSessionResponse,
        RevokeUserSessionsResponse,
    },
    error::HttpError,
    state::AppState,
};
use crate::core::session::BrowserSession;
use crate::core::tenant::Tenant;
use crate::core::usecases::ports::SessionStats;

const DEFAULT_LIMIT: i64 = 50;
/// Sessions idle longer than this are expired for cleanup purposes.
const DEFAULT_MAX_AGE_MS: i64 = 7 * 24 * 3600 * 1000;

/// GET /admin/sessions
pub async fn list_tenant_sessions(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<BrowserSession>>, HttpError> {
    let sessions = state
        .admin_sessions
        .list_tenant_sessions(
            &tenant.id,
            page.active_only.unwrap_or(false),
            page.limit.unwrap_or(DEFAULT_LIMIT),
            page.offset.unwrap_or(0),
        )
        .await?;
    Ok(Json(sessions))
}

/// GET /admin/sessions/stats
pub async fn stats(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
) -> Result<Json<SessionStats>, HttpError> {
    Ok(Json(state.admin_sessions.session_stats(Some(&tenant.id)).await?))
}

/// DELETE /admin/sessions/{sessionId}
pub async fn revoke_session(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Path(session_id): Path<String>,
) -> Result<Json<RevokeSessionResponse>, HttpError> {
    let accounts_revoked = state
        .admin_sessions
        .revoke_session(&session_id, &tenant.id)
        .await?;
    Ok(Json(RevokeSessionResponse { accounts_revoked }))
}

/// POST /admin/sessions/cleanup
pub async fn cleanup(
    State(state): State<AppState>,
    Json(body): Json<CleanupRequest>,
) -> Result<Json<CleanupResponse>, HttpError> {
    let sessions_removed = state
        .admin_sessions
        .cleanup_expired_sessions(body.max_age_ms.unwrap_or(DEFAULT_MAX_AGE_MS))
        .await?;
    Ok(Json(CleanupResponse { sessions_removed }))
}

/// GET /admin/users/{userId}/sessions
pub async fn list_user_sessions(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Path(user_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let rows = state
        .admin_sessions
        .list_user_sessions(
            &user_id,
            &tenant.id,
            page.limit.unwrap_or(DEFAULT_LIMIT),
            page.offset.unwrap_or(0),
        )
        .await?;

    let sessions: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            serde_json::json!({
                "session": &row.browser,
                "account": AccountView::from(&row.account),
            })
        })
        .collect();
    Ok(Json(serde_json::json!({ "sessions": sessions })))
}

/// DELETE /admin/users/{userId}/sessions/{sessionId}
pub async fn revoke_user_session(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Path((_user_id, session_id)): Path<(String, String)>,
) -> Result<Json<RevokeSessionResponse>, HttpError> {
    let accounts_revoked = state
        .admin_sessions
        .revoke_session(&session_id, &tenant.id)
        .await?;
    Ok(Json(RevokeSessionResponse { accounts_revoked }))
}

/// DELETE /admin/users/{userId}/sessions
pub async fn revoke_all_user_sessions(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Path(user_id): Path<String>,
) -> Result<Json<RevokeUserSessionsResponse>, HttpError> {
    let sessions_revoked = state
        .admin_sessions
        .revoke_all_user_sessions(&user_id, &tenant.id)
        .await?;
    Ok(Json(RevokeUserSessionsResponse { sessions_revoked }))
}
