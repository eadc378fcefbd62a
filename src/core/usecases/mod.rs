//! Core use cases and business orchestration layer.
//!
//! This module defines the orchestration logic for the authorization
//! pipeline: sessions, the `/authorize` state machine, token grants, RBAC,
//! revocation, theming, auditing, and the M2M subsystem. It coordinates the
//! core domain types and enforces the issuer's invariants. All
//! infrastructure concerns are abstracted via ports.
//!
//! # Constraints
//!
//! - No direct database, HTTP, or cryptographic logic
//! - All external dependencies are abstracted via ports
//!
//! # Main Services
//!
//! - [`BrowserSessionService`]: the multi-account session state machine
//! - [`AdminSessionService`]: SQL-backed session administration
//! - [`AuthorizeFlow`]: the `/authorize` front controller
//! - [`TokenGrantService`]: `/token` grants and `/userinfo`
//! - [`RbacService`]: cached permission checks and the role catalog
//! - [`RevocationService`]: deny list and refresh-family invalidation
//! - [`ThemeResolver`]: the branding priority chain
//! - [`AuditService`]: fire-and-forget event trail
//! - [`M2mService`]: client-credentials tokens
//! - [`ProviderBridge`]: upstream provider dispatch with timeouts

pub mod admin_sessions;
pub mod audit_service;
pub mod authorize_flow;
pub mod m2m_service;
pub mod provider_bridge;
pub mod rbac_service;
pub mod revocation;
pub mod session_service;
pub mod theme_resolver;
pub mod token_grants;

pub mod ports;

#[cfg(test)]
pub mod testing;

#[cfg(test)]
mod tests;

pub use admin_sessions::AdminSessionService;
pub use audit_service::{spawn_consumer, AuditService};
pub use authorize_flow::{
    append_query, error_redirect, AuthorizeFlow, AuthorizeReply, AuthorizeState, FlowOutcome,
    TokenTtlConfig, STATE_AAD, STATE_TTL_SECONDS,
};
pub use m2m_service::{IssuedM2mToken, M2mService};
pub use provider_bridge::ProviderBridge;
pub use rbac_service::{RbacConfig, RbacService};
pub use revocation::RevocationService;
pub use session_service::{BrowserSessionService, SessionConfig};
pub use theme_resolver::ThemeResolver;
pub use token_grants::{wire_refresh_token, TokenGrantService, TokenRequest, TokenResponse};
