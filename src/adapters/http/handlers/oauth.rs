// OAuth / OIDC endpoints: /authorize, the provider bridge routes, /token,
// /userinfo, and the discovery documents.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Extension, Form, Json,
};

use crate::adapters::http::{
    dto::{AuthorizeQuery, TokenForm},
    error::HttpError,
    middleware::{clear_cookie_header, session_cookie_header, BearerToken, SessionContext},
    state::AppState,
};
use crate::core::error::{CoreError, FlowError};
use crate::core::oauth::{AuthorizeRequest, Prompt};
use crate::core::session::{AccountSession, SessionCookie};
use crate::core::tenant::Tenant;
use crate::core::usecases::ports::ProviderAction;
use crate::core::usecases::{append_query, error_redirect, AuthorizeReply};

/// Suffix of the short-lived cookie carrying the sealed authorization state
/// across the provider round-trip.
const STATE_COOKIE_SUFFIX: &str = ".state";

fn state_cookie_name(state: &AppState) -> String {
    format!("{}{}", state.http.cookie_name, STATE_COOKIE_SUFFIX)
}

/// 302 Found. axum's `Redirect` helpers emit 303/307; OAuth redirects are
/// conventionally 302.
fn found(url: &str) -> Response {
    let mut response = StatusCode::FOUND.into_response();
    if let Ok(value) = HeaderValue::from_str(url) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    response
}

fn with_cookie(mut response: Response, cookie: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

fn request_is_secure(headers: &axum::http::HeaderMap) -> bool {
    headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .map(|proto| proto.eq_ignore_ascii_case("https"))
        .unwrap_or(false)
}

/// GET /authorize: the front controller.
pub async fn authorize(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Extension(SessionContext(session)): Extension<SessionContext>,
    headers: axum::http::HeaderMap,
    Query(query): Query<AuthorizeQuery>,
) -> Result<Response, HttpError> {
    let request = query.into_domain()?;
    let redirect_uri = request.redirect_uri.clone();
    let oauth_state = request.state.clone();
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok());

    match state.flow.begin(request, &tenant.id, host, session).await {
        Ok(outcome) => Ok(render_reply(&state, &headers, outcome.reply)),
        // Post-validation OAuth failures redirect back to the client with
        // the machine code; everything else renders JSON.
        Err(CoreError::Flow(FlowError::LoginRequired)) => {
            let url = error_redirect(
                &redirect_uri,
                "login_required",
                "Login required",
                oauth_state.as_deref(),
            );
            Ok(found(&url))
        }
        Err(CoreError::Flow(FlowError::ProviderError { reason })) => {
            let url = error_redirect(
                &redirect_uri,
                "provider_error",
                &reason,
                oauth_state.as_deref(),
            );
            Ok(found(&url))
        }
        Err(err) => Err(err.into()),
    }
}

fn render_reply(state: &AppState, headers: &axum::http::HeaderMap, reply: AuthorizeReply) -> Response {
    let secure = request_is_secure(headers);
    match reply {
        AuthorizeReply::Redirect { url } => found(&url),
        AuthorizeReply::AccountPicker { accounts, request } => {
            Html(render_account_picker(&accounts, &request)).into_response()
        }
        AuthorizeReply::ProviderSelection {
            providers,
            state: blob,
        } => {
            let cookie = session_cookie_header(&state_cookie_name(state), &blob, 600, secure);
            with_cookie(
                Html(render_provider_selection(&providers)).into_response(),
                &cookie,
            )
        }
        AuthorizeReply::Provider {
            action,
            state: blob,
        } => {
            let cookie = session_cookie_header(&state_cookie_name(state), &blob, 600, secure);
            let response = match action {
                ProviderAction::Redirect { url } => found(&url),
                ProviderAction::Render { html } => Html(html).into_response(),
            };
            with_cookie(response, &cookie)
        }
    }
}

/// GET /{provider}/authorize: re-enter the bridge for a chosen provider.
pub async fn provider_authorize(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    headers: axum::http::HeaderMap,
) -> Result<Response, HttpError> {
    let blob = cookie_from_headers(&headers, &state_cookie_name(&state)).ok_or_else(|| {
        HttpError::bad_request("invalid_state", "authorization state is missing or expired")
    })?;

    let action = state
        .bridge
        .begin(&provider, &blob)
        .await
        .map_err(|e| HttpError::from(CoreError::from(e)))?;

    Ok(match action {
        ProviderAction::Redirect { url } => found(&url),
        ProviderAction::Render { html } => Html(html).into_response(),
    })
}

/// GET /{provider}/callback: provider return; completes the flow.
pub async fn provider_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Extension(SessionContext(session)): Extension<SessionContext>,
    headers: axum::http::HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, HttpError> {
    let (identity, echoed_state) = state
        .bridge
        .callback(&provider, &params)
        .await
        .map_err(|e| HttpError::from(CoreError::from(e)))?;

    // The provider echoes the sealed state; the cookie is the fallback for
    // providers that cannot thread it through.
    let blob = if !echoed_state.is_empty() {
        echoed_state
    } else {
        cookie_from_headers(&headers, &state_cookie_name(&state)).ok_or_else(|| {
            HttpError::bad_request("invalid_state", "authorization state is missing or expired")
        })?
    };

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .unwrap_or("unknown");

    let (url, new_session, created) = state
        .flow
        .complete(&blob, &identity, session, user_agent, ip_address)
        .await
        .map_err(HttpError::from)?;

    let secure = request_is_secure(&headers);
    let mut response = found(&url);
    if created {
        let cookie = SessionCookie::new(new_session.id.clone(), new_session.tenant_id.clone());
        let sealed = state
            .codec
            .seal(
                &state.http.cookie_name,
                &serde_json::to_vec(&cookie)
                    .map_err(|e| HttpError::internal(format!("cookie encode failed: {}", e)))?,
            )
            .map_err(|e| HttpError::internal(e.to_string()))?;
        let header = session_cookie_header(
            &state.http.cookie_name,
            &sealed,
            state.http.session_lifetime_seconds,
            secure,
        );
        response = with_cookie(response, &header);
    }
    response = with_cookie(response, &clear_cookie_header(&state_cookie_name(&state)));
    Ok(response)
}

/// POST /token: grant dispatch.
pub async fn token(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Form(form): Form<TokenForm>,
) -> Result<Json<crate::core::usecases::TokenResponse>, HttpError> {
    let response = state.grants.token(form.into(), &tenant.id).await?;
    Ok(Json(response))
}

/// GET /userinfo: claims of a live access token.
pub async fn userinfo(
    State(state): State<AppState>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let claims = state
        .signer
        .verify_access(&token)
        .map_err(|e| HttpError::unauthorized(e.code(), e.to_string()))?;

    if let Some(jti) = &claims.jti {
        if state.revocation.is_access_token_revoked(jti).await {
            return Err(HttpError::unauthorized("invalid_token", "token has been revoked"));
        }
    }

    let info = state.grants.userinfo(&token).await?;
    Ok(Json(info))
}

/// GET /.well-known/openid-configuration
pub async fn openid_configuration(State(state): State<AppState>) -> Json<serde_json::Value> {
    let issuer = &state.http.issuer_url;
    Json(serde_json::json!({
        "issuer": issuer,
        "authorization_endpoint": format!("{}/authorize", issuer),
        "token_endpoint": format!("{}/token", issuer),
        "userinfo_endpoint": format!("{}/userinfo", issuer),
        "jwks_uri": format!("{}/.well-known/jwks.json", issuer),
        "response_types_supported": ["code"],
        "grant_types_supported": ["authorization_code", "refresh_token", "client_credentials"],
        "subject_types_supported": ["public"],
        "id_token_signing_alg_values_supported": ["EdDSA"],
        "token_endpoint_auth_methods_supported": ["client_secret_post"],
        "code_challenge_methods_supported": ["S256"],
        "prompt_values_supported": ["none", "login", "consent", "select_account"],
        "claims_supported": [
            "iss", "sub", "aud", "exp", "iat", "nonce",
            "roles", "permissions", "tenant_id"
        ],
    }))
}

/// GET /.well-known/oauth-authorization-server
pub async fn oauth_authorization_server(State(state): State<AppState>) -> Json<serde_json::Value> {
    let issuer = &state.http.issuer_url;
    Json(serde_json::json!({
        "issuer": issuer,
        "authorization_endpoint": format!("{}/authorize", issuer),
        "token_endpoint": format!("{}/token", issuer),
        "jwks_uri": format!("{}/.well-known/jwks.json", issuer),
        "response_types_supported": ["code"],
        "grant_types_supported": ["authorization_code", "refresh_token", "client_credentials"],
        "code_challenge_methods_supported": ["S256"],
    }))
}

/// GET /.well-known/jwks.json
pub async fn jwks(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.signer.jwks())
}

fn cookie_from_headers(headers: &axum::http::HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(header::COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

// Minimal server-rendered pages. Styling and branding are the embedding
// application's concern; these pages only need working links.

fn render_account_picker(accounts: &[AccountSession], request: &AuthorizeRequest) -> String {
    let mut items = String::new();
    for account in accounts {
        let email = account
            .subject_properties
            .get("email")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let name = account
            .subject_properties
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or(&account.user_id);
        let avatar = account
            .subject_properties
            .get("avatar")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let href = picker_href(request, Some(&account.user_id), None);
        items.push_str(&format!(
            r#"<li><a href="{}" data-avatar="{}"><span class="name">{}</span> <span class="email">{}</span></a></li>"#,
            href, avatar, name, email
        ));
    }
    let other = picker_href(request, None, Some(Prompt::Login));
    format!(
        r#"<!doctype html>
<html><head><title>Choose an account</title></head>
<body>
<h1>Choose an account</h1>
<ul class="accounts">{}</ul>
<p><a class="use-another" href="{}">Use another account</a></p>
</body></html>"#,
        items, other
    )
}

/// Rebuild the /authorize URL with an account pinned or a prompt override.
fn picker_href(
    request: &AuthorizeRequest,
    account_hint: Option<&str>,
    prompt: Option<Prompt>,
) -> String {
    let mut params: Vec<(&str, &str)> = vec![
        ("response_type", request.response_type.as_str()),
        ("client_id", request.client_id.as_str()),
        ("redirect_uri", request.redirect_uri.as_str()),
    ];
    if let Some(scope) = &request.scope {
        params.push(("scope", scope));
    }
    if let Some(state) = &request.state {
        params.push(("state", state));
    }
    if let Some(nonce) = &request.nonce {
        params.push(("nonce", nonce));
    }
    if let Some(challenge) = &request.code_challenge {
        params.push(("code_challenge", challenge));
        params.push(("code_challenge_method", "S256"));
    }
    if let Some(hint) = account_hint {
        params.push(("account_hint", hint));
    }
    let prompt_value = prompt.map(|p| p.as_str());
    if let Some(prompt_value) = prompt_value {
        params.push(("prompt", prompt_value));
    }
    append_query("/authorize", &params)
}

fn render_provider_selection(providers: &[String]) -> String {
    let mut items = String::new();
    for provider in providers {
        items.push_str(&format!(
            r#"<li><a href="/{}/authorize">Continue with {}</a></li>"#,
            provider, provider
        ));
    }
    format!(
        r#"<!doctype html>
<html><head><title>Sign in</title></head>
<body>
<h1>Sign in</h1>
<ul class="providers">{}</ul>
</body></html>"#,
        items
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::NewAccount;
    use serde_json::json;

    fn request() -> AuthorizeRequest {
        AuthorizeRequest {
            client_id: "app-1".to_string(),
            redirect_uri: "https://app/cb".to_string(),
            response_type: "code".to_string(),
            scope: None,
            state: Some("s1".to_string()),
            nonce: None,
            prompt: Some(Prompt::SelectAccount),
            login_hint: None,
            account_hint: None,
            max_age: None,
            audience: None,
            code_challenge: None,
            code_challenge_method: None,
        }
    }

    #[test]
    fn test_picker_lists_accounts_and_login_link() {
        let accounts = vec![
            AccountSession::from_new(
                "bs-1",
                NewAccount {
                    user_id: "u1".to_string(),
                    subject_type: "user".to_string(),
                    subject_properties: json!({"email": "u1@example.com"}),
                    refresh_token: "rt".to_string(),
                    client_id: "app-1".to_string(),
                    ttl_seconds: 60,
                },
            ),
            AccountSession::from_new(
                "bs-1",
                NewAccount {
                    user_id: "u2".to_string(),
                    subject_type: "user".to_string(),
                    subject_properties: json!({"email": "u2@example.com"}),
                    refresh_token: "rt".to_string(),
                    client_id: "app-1".to_string(),
                    ttl_seconds: 60,
                },
            ),
        ];
        let html = render_account_picker(&accounts, &request());
        assert!(html.contains("u1@example.com"));
        assert!(html.contains("u2@example.com"));
        assert!(html.contains("prompt=login"));
        assert!(html.contains("account_hint=u1"));
        assert!(html.contains("state=s1"));
    }

    #[test]
    fn test_provider_selection_links() {
        let html = render_provider_selection(&["google".to_string(), "password".to_string()]);
        assert!(html.contains("/google/authorize"));
        assert!(html.contains("/password/authorize"));
    }
}
