// HTTP server shared state

use std::sync::Arc;

use crate::adapters::persistence::Database;
use crate::core::tenant::ResolverConfig;
use crate::core::usecases::ports::{
    ClientRegistry, SecretVerifier, StateCodec, Storage, TenantStore, TokenSigner,
};
use crate::core::usecases::{
    AdminSessionService, AuditService, AuthorizeFlow, BrowserSessionService, M2mService,
    ProviderBridge, RbacService, RevocationService, ThemeResolver, TokenGrantService,
};

/// Request-independent HTTP configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Issuer URL advertised in discovery documents and token claims
    pub issuer_url: String,
    /// Session cookie name (default `openauth.session`)
    pub cookie_name: String,
    /// Cookie Max-Age, aligned with the absolute session TTL
    pub session_lifetime_seconds: i64,
}

/// Application state shared across all HTTP handlers.
///
/// Contains services and ports only; handlers never reach past these into
/// raw storage or SQL.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub tenants: Arc<dyn TenantStore>,
    pub clients: Arc<dyn ClientRegistry>,
    pub secrets: Arc<dyn SecretVerifier>,
    pub codec: Arc<dyn StateCodec>,
    pub signer: Arc<dyn TokenSigner>,
    pub sessions: Arc<BrowserSessionService>,
    pub admin_sessions: Arc<AdminSessionService>,
    pub rbac: Arc<RbacService>,
    pub revocation: Arc<RevocationService>,
    pub audit: Arc<AuditService>,
    pub flow: Arc<AuthorizeFlow>,
    pub grants: Arc<TokenGrantService>,
    pub m2m: Arc<M2mService>,
    pub bridge: Arc<ProviderBridge>,
    pub theme: Arc<ThemeResolver>,
    pub resolver: Arc<ResolverConfig>,
    pub http: Arc<HttpConfig>,
    /// Present when a SQL mirror is configured; drives the readiness probe
    pub db: Option<Database>,
}
