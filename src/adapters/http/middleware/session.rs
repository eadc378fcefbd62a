// Browser-session middleware

use axum::{
    extract::{Request, State},
    http::header::COOKIE,
    middleware::Next,
    response::Response,
};

use crate::adapters::http::state::AppState;
use crate::core::session::{BrowserSession, SessionCookie};
use crate::core::tenant::Tenant;

/// The request's browser session, when a valid cookie presented one.
/// Always inserted, so handlers can extract it unconditionally.
#[derive(Debug, Clone, Default)]
pub struct SessionContext(pub Option<BrowserSession>);

/// Decode the session cookie and attach the browser session.
///
/// Every failure mode: missing cookie, integrity failure, tenant
/// mismatch, unknown or expired session: resolves to "no session
/// present", never an error. A valid session gets its sliding window
/// refreshed.
#[axum::debug_middleware]
pub async fn attach_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = load_session(&state, &request).await;
    request.extensions_mut().insert(SessionContext(session));
    next.run(request).await
}

async fn load_session(state: &AppState, request: &Request) -> Option<BrowserSession> {
    let tenant_id = request.extensions().get::<Tenant>()?.id.clone();
    let cookie_value = cookie_value(request, &state.http.cookie_name)?;
    let bytes = state.codec.open(&state.http.cookie_name, &cookie_value)?;
    let cookie: SessionCookie = serde_json::from_slice(&bytes).ok()?;
    if !cookie.belongs_to(&tenant_id) {
        return None;
    }

    let mut session = state
        .sessions
        .get_browser_session(&cookie.session_id, &tenant_id)
        .await
        .ok()??;
    // Best effort: a failed touch still serves the request.
    let _ = state.sessions.touch(&mut session).await;
    Some(session)
}

fn cookie_value(request: &Request, name: &str) -> Option<String> {
    let header = request.headers().get(COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

/// Serialize a Set-Cookie header for the session cookie.
pub fn session_cookie_header(name: &str, value: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut header = format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        name, value, max_age_seconds
    );
    if secure {
        header.push_str("; Secure");
    }
    header
}

/// Serialize a Set-Cookie header that clears a cookie.
pub fn clear_cookie_header(name: &str) -> String {
    format!("{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let header = session_cookie_header("openauth.session", "blob", 604800, true);
        assert!(header.starts_with("openauth.session=blob"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=Lax"));
        assert!(header.contains("Max-Age=604800"));
        assert!(header.contains("Secure"));

        let plain = session_cookie_header("openauth.session", "blob", 60, false);
        assert!(!plain.contains("Secure"));
    }

    #[test]
    fn test_clear_cookie_zeroes_max_age() {
        assert!(clear_cookie_header("x").contains("Max-Age=0"));
    }
}
