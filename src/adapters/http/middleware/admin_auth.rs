// Admin-surface authentication: M2M bearer token with the admin scope.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::adapters::http::{error::HttpError, state::AppState};

/// Scope required on M2M tokens calling the admin surface.
pub const ADMIN_SCOPE: &str = "admin";

/// Verify the caller holds a valid M2M token carrying the admin scope.
/// Verified claims land in request extensions for handlers that care who
/// acted.
pub async fn m2m_admin_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or_else(|| HttpError::unauthorized("invalid_token", "bearer token required"))?;

    let claims = state
        .m2m
        .verify_m2m_token(&token, None)
        .map_err(|e| HttpError::unauthorized(e.code(), e.to_string()))?;

    if !claims.has_scope(ADMIN_SCOPE) {
        return Err(HttpError::new(
            axum::http::StatusCode::FORBIDDEN,
            "insufficient_scope",
            "admin scope required",
        ));
    }

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
