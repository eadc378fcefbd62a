// Browser-facing session endpoints: account listing, switching, removal,
// and the CORS-enabled session check.

use axum::{extract::Path, extract::State, Extension, Json};

use crate::adapters::http::{
    dto::{
        AccountView, AccountsResponse, SessionCheckResponse, SuccessResponse,
        SwitchAccountRequest,
    },
    error::HttpError,
    middleware::SessionContext,
    state::AppState,
};
use crate::core::error::{CoreError, SessionError};
use crate::core::session::BrowserSession;

fn require_session(session: Option<BrowserSession>) -> Result<BrowserSession, HttpError> {
    session.ok_or_else(|| {
        HttpError::from(CoreError::from(SessionError::session_not_found("no cookie")))
    })
}

/// GET /session/accounts: fast path, KV only.
pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(SessionContext(session)): Extension<SessionContext>,
) -> Result<Json<AccountsResponse>, HttpError> {
    let accounts = match session {
        Some(session) => state
            .sessions
            .list_accounts(&session.id)
            .await?
            .iter()
            .map(AccountView::from)
            .collect(),
        None => Vec::new(),
    };
    Ok(Json(AccountsResponse { accounts }))
}

/// POST /session/switch: make another in-session account active.
pub async fn switch_account(
    State(state): State<AppState>,
    Extension(SessionContext(session)): Extension<SessionContext>,
    Json(body): Json<SwitchAccountRequest>,
) -> Result<Json<SuccessResponse>, HttpError> {
    let session = require_session(session)?;
    state
        .sessions
        .switch_active_account(&session, &body.user_id)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

/// DELETE /session/accounts/{userId}
pub async fn remove_account(
    State(state): State<AppState>,
    Extension(SessionContext(session)): Extension<SessionContext>,
    Path(user_id): Path<String>,
) -> Result<Json<SuccessResponse>, HttpError> {
    let session = require_session(session)?;
    state.sessions.remove_account(&session, &user_id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// DELETE /session/all
pub async fn remove_all_accounts(
    State(state): State<AppState>,
    Extension(SessionContext(session)): Extension<SessionContext>,
) -> Result<Json<SuccessResponse>, HttpError> {
    let session = require_session(session)?;
    state.sessions.remove_all_accounts(&session).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// GET /session/check: lightweight probe for embedding apps (CORS
/// enabled at the router).
pub async fn check(
    State(state): State<AppState>,
    Extension(SessionContext(session)): Extension<SessionContext>,
) -> Result<Json<SessionCheckResponse>, HttpError> {
    match session {
        Some(session) => {
            let count = state.sessions.list_accounts(&session.id).await?.len();
            Ok(Json(SessionCheckResponse::from_session(&session, count)))
        }
        None => Ok(Json(SessionCheckResponse::inactive())),
    }
}
