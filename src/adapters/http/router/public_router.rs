// Public, browser- and app-facing routes.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::adapters::http::{handlers, middleware, state::AppState};

/// OAuth / OIDC endpoints plus the provider bridge.
pub fn oauth_routes() -> Router<AppState> {
    Router::new()
        .route("/authorize", get(handlers::oauth::authorize))
        .route("/token", post(handlers::oauth::token))
        .route(
            "/userinfo",
            get(handlers::oauth::userinfo).layer(axum::middleware::from_fn(middleware::bearer_auth)),
        )
        .route("/{provider}/authorize", get(handlers::oauth::provider_authorize))
        .route("/{provider}/callback", get(handlers::oauth::provider_callback))
}

/// Discovery documents.
pub fn well_known_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/.well-known/openid-configuration",
            get(handlers::oauth::openid_configuration),
        )
        .route(
            "/.well-known/oauth-authorization-server",
            get(handlers::oauth::oauth_authorization_server),
        )
        .route("/.well-known/jwks.json", get(handlers::oauth::jwks))
}

/// Browser session management.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/session/accounts", get(handlers::session::list_accounts))
        .route("/session/switch", post(handlers::session::switch_account))
        .route(
            "/session/accounts/{userId}",
            delete(handlers::session::remove_account),
        )
        .route("/session/all", delete(handlers::session::remove_all_accounts))
        // Embedding apps poll this cross-origin.
        .route(
            "/session/check",
            get(handlers::session::check).layer(CorsLayer::permissive()),
        )
}

/// RBAC checks for applications holding a user access token.
pub fn rbac_routes() -> Router<AppState> {
    Router::new()
        .route("/rbac/check", post(handlers::rbac::check))
        .route("/rbac/check/batch", post(handlers::rbac::check_batch))
        .route("/rbac/roles", get(handlers::rbac::roles))
        .route("/rbac/permissions", get(handlers::rbac::permissions))
        .layer(axum::middleware::from_fn(middleware::bearer_auth))
}
