//! Use case: the `/authorize` front controller.
//!
//! A single flat pass, no loops:
//! 1. validate client, redirect URI, response type
//! 2. compute the effective account (active account, then `account_hint`,
//!    then `login_hint` overrides)
//! 3. handle `prompt` (`none` / `login` / `consent` / `select_account`)
//! 4. apply `max_age`
//! 5. silent authorization when a valid session covers the request
//! 6. otherwise dispatch to the upstream provider bridge
//!
//! The provider round-trip carries a sealed state blob; the success path
//! re-enters through [`AuthorizeFlow::complete`], which runs the
//! enterprise enrichment (user hook, RBAC claims, session update) before
//! redirecting back to the client with a fresh authorization code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::audit::AuditEventType;
use crate::core::error::{CoreError, FlowError, StorageError};
use crate::core::oauth::{
    default_redirect_allow, effective_account, exceeds_max_age, AuthorizationCode,
    AuthorizeRequest, PkceChallenge, Prompt, Subject, CODE_TTL_SECONDS,
};
use crate::core::session::{AccountSession, BrowserSession, NewAccount};
use crate::core::token::{ACCESS_TTL_SECONDS, REFRESH_TTL_SECONDS};
use crate::core::usecases::audit_service::AuditService;
use crate::core::usecases::ports::{
    storage_key, ClientRegistry, Clock, ProviderAction, ProviderIdentity, StateCodec, Storage,
    SuccessResponder,
};
use crate::core::usecases::provider_bridge::ProviderBridge;
use crate::core::usecases::rbac_service::RbacService;
use crate::core::usecases::session_service::BrowserSessionService;

/// AAD label binding sealed blobs to the authorization flow.
pub const STATE_AAD: &str = "authorize.state";
/// Sealed-state lifetime across the provider round-trip.
pub const STATE_TTL_SECONDS: i64 = 600;

/// What survives the provider round-trip, sealed into the state blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizeState {
    pub request: AuthorizeRequest,
    pub tenant_id: String,
    pub created_at: DateTime<Utc>,
}

/// How `/authorize` concluded; the HTTP layer renders each arm.
pub enum AuthorizeReply {
    /// 302 back to the client (silent success or error-with-redirect)
    Redirect { url: String },
    /// Render the account picker
    AccountPicker {
        accounts: Vec<AccountSession>,
        request: Box<AuthorizeRequest>,
    },
    /// Render provider selection (more than one provider registered)
    ProviderSelection { providers: Vec<String>, state: String },
    /// Single provider: follow its action directly
    Provider { action: ProviderAction, state: String },
}

/// Outcome of `begin`, with the (possibly switched) session attached.
pub struct FlowOutcome {
    pub reply: AuthorizeReply,
    pub session: Option<BrowserSession>,
}

/// Issuer token-lifetime defaults handed to minted codes.
#[derive(Debug, Clone)]
pub struct TokenTtlConfig {
    pub access_ttl_seconds: u64,
    pub refresh_ttl_seconds: u64,
}

impl Default for TokenTtlConfig {
    fn default() -> Self {
        Self {
            access_ttl_seconds: ACCESS_TTL_SECONDS,
            refresh_ttl_seconds: REFRESH_TTL_SECONDS,
        }
    }
}

pub struct AuthorizeFlow {
    sessions: Arc<BrowserSessionService>,
    rbac: Arc<RbacService>,
    clients: Arc<dyn ClientRegistry>,
    codec: Arc<dyn StateCodec>,
    bridge: Arc<ProviderBridge>,
    responder: Arc<dyn SuccessResponder>,
    storage: Arc<dyn Storage>,
    audit: Arc<AuditService>,
    clock: Arc<dyn Clock>,
    ttls: TokenTtlConfig,
}

impl AuthorizeFlow {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sessions: Arc<BrowserSessionService>,
        rbac: Arc<RbacService>,
        clients: Arc<dyn ClientRegistry>,
        codec: Arc<dyn StateCodec>,
        bridge: Arc<ProviderBridge>,
        responder: Arc<dyn SuccessResponder>,
        storage: Arc<dyn Storage>,
        audit: Arc<AuditService>,
        clock: Arc<dyn Clock>,
        ttls: TokenTtlConfig,
    ) -> Self {
        Self {
            sessions,
            rbac,
            clients,
            codec,
            bridge,
            responder,
            storage,
            audit,
            clock,
            ttls,
        }
    }

    /// The single-pass `/authorize` state machine.
    pub async fn begin(
        &self,
        request: AuthorizeRequest,
        tenant_id: &str,
        request_host: Option<&str>,
        session: Option<BrowserSession>,
    ) -> Result<FlowOutcome, CoreError> {
        // Step 1: request validation. Failures here have no trustworthy
        // redirect target and render as JSON upstream.
        if request.response_type != "code" {
            return Err(FlowError::unsupported_response_type(&request.response_type).into());
        }
        if let Some(method) = &request.code_challenge_method {
            if method != "S256" {
                return Err(
                    FlowError::invalid_request("only S256 code challenges are supported").into(),
                );
            }
        }

        let client = self
            .clients
            .get(&request.client_id)
            .await?
            .filter(|c| c.tenant_id == tenant_id)
            .ok_or_else(|| FlowError::unauthorized_client("unknown client"))?;

        let redirect_allowed = client.allows_redirect_uri(&request.redirect_uri)
            || default_redirect_allow(&request.redirect_uri, request_host);
        if !redirect_allowed {
            return Err(FlowError::unauthorized_client("redirect_uri not allowed").into());
        }

        // Step 2: effective account, with hint overrides.
        let accounts = match &session {
            Some(session) => self.sessions.list_accounts(&session.id).await?,
            None => Vec::new(),
        };
        let active_user = session.as_ref().and_then(|s| s.active_user_id.as_deref());
        let effective = effective_account(
            &accounts,
            active_user,
            request.account_hint.as_deref(),
            request.login_hint.as_deref(),
        )
        .map(|(account, switched)| (account.clone(), switched));

        let mut session = session;
        if let (Some(session_ref), Some((account, true))) = (&session, &effective) {
            let updated = self
                .sessions
                .switch_active_account(session_ref, &account.user_id)
                .await?;
            session = Some(updated);
        }

        // Step 3: prompt handling.
        let mut silent = false;
        let mut force_reauth = false;
        match request.prompt {
            Some(Prompt::None) => {
                if session.is_none() || effective.is_none() {
                    return Err(FlowError::LoginRequired.into());
                }
                silent = true;
            }
            Some(Prompt::Login) => {
                silent = false;
                force_reauth = true;
            }
            Some(Prompt::Consent) | None => {}
            Some(Prompt::SelectAccount) => {
                if accounts.len() > 1 {
                    return Ok(FlowOutcome {
                        reply: AuthorizeReply::AccountPicker {
                            accounts,
                            request: Box::new(request),
                        },
                        session,
                    });
                }
            }
        }

        // A session that covers the request also satisfies the promptless
        // case and a select_account that had nothing to pick between.
        let no_ui_requested = matches!(request.prompt, None | Some(Prompt::SelectAccount));
        if !silent && no_ui_requested && effective.is_some() {
            silent = true;
        }

        // Step 4: max_age.
        if let (Some(max_age), Some((account, _))) = (request.max_age, &effective) {
            if exceeds_max_age(account, max_age, self.clock.now()) {
                force_reauth = true;
            }
        }

        // Step 5: silent authorization.
        if silent && !force_reauth {
            if let Some((account, _)) = &effective {
                let subject = Subject::new(
                    account.subject_type.clone(),
                    account.user_id.clone(),
                    account.subject_properties.clone(),
                );
                let url = self.mint_code_redirect(&subject, &request, tenant_id).await?;
                return Ok(FlowOutcome {
                    reply: AuthorizeReply::Redirect { url },
                    session,
                });
            }
        }

        // Step 6: provider dispatch.
        let state = self.seal_state(&request, tenant_id)?;
        let reply = if self.bridge.len() == 1 {
            let name = self.bridge.names().remove(0);
            let action = self.bridge.begin(&name, &state).await?;
            AuthorizeReply::Provider { action, state }
        } else {
            AuthorizeReply::ProviderSelection {
                providers: self.bridge.names(),
                state,
            }
        };
        Ok(FlowOutcome { reply, session })
    }

    /// Provider-success completion: user hook, session update, RBAC
    /// enrichment, code mint, redirect. Returns the redirect URL, the
    /// session (created if the browser had none), and whether it is new.
    pub async fn complete(
        &self,
        state_blob: &str,
        identity: &ProviderIdentity,
        session: Option<BrowserSession>,
        user_agent: &str,
        ip_address: &str,
    ) -> Result<(String, BrowserSession, bool), CoreError> {
        let state = self.open_state(state_blob)?;

        let subject = self
            .responder
            .on_success(&state.tenant_id, identity)
            .await?;

        let (session, created) = match session.filter(|s| s.tenant_id == state.tenant_id) {
            Some(session) => (session, false),
            None => {
                let session = self
                    .sessions
                    .create_browser_session(&state.tenant_id, user_agent, ip_address)
                    .await?;
                (session, true)
            }
        };

        // RBAC-derived claims, set-union merged with app-supplied ones.
        let enriched = self
            .rbac
            .enrich_token_claims(&state.tenant_id, &subject.subject_id, &state.request.client_id)
            .await?
            .merged_with(identity.roles.clone(), identity.permissions.clone());

        let mut properties = subject.properties.clone();
        if !properties.is_object() {
            properties = serde_json::json!({});
        }
        properties["roles"] = serde_json::json!(enriched.roles);
        properties["permissions"] = serde_json::json!(enriched.permissions);

        let (_, session) = self
            .sessions
            .add_account_to_session(
                &session,
                NewAccount {
                    user_id: subject.subject_id.clone(),
                    subject_type: subject.subject_type.clone(),
                    subject_properties: properties.clone(),
                    refresh_token: Uuid::new_v4().to_string(),
                    client_id: state.request.client_id.clone(),
                    ttl_seconds: self.sessions.config().lifetime_seconds,
                },
            )
            .await?;

        let enriched_subject = Subject::new(subject.subject_type, subject.subject_id, properties);
        let url = self
            .mint_code_redirect(&enriched_subject, &state.request, &state.tenant_id)
            .await?;
        Ok((url, session, created))
    }

    /// Store a one-shot authorization code and build the success redirect.
    async fn mint_code_redirect(
        &self,
        subject: &Subject,
        request: &AuthorizeRequest,
        tenant_id: &str,
    ) -> Result<String, CoreError> {
        let code = Uuid::new_v4().to_string();
        let record = AuthorizationCode {
            subject: subject.clone(),
            redirect_uri: request.redirect_uri.clone(),
            client_id: request.client_id.clone(),
            tenant_id: tenant_id.to_string(),
            pkce: request.code_challenge.as_ref().map(|challenge| PkceChallenge {
                challenge: challenge.clone(),
                method: "S256".to_string(),
            }),
            nonce: request.nonce.clone(),
            scope: request.scope.clone(),
            audience: request.audience.clone(),
            access_ttl_seconds: self.ttls.access_ttl_seconds,
            refresh_ttl_seconds: self.ttls.refresh_ttl_seconds,
        };
        let value = serde_json::to_value(&record)
            .map_err(|e| StorageError::serialization(format!("encode code failed: {}", e)))?;
        self.storage
            .set(
                &storage_key(&["oauth", "code", &code]),
                value,
                Some(std::time::Duration::from_secs(CODE_TTL_SECONDS)),
            )
            .await?;

        self.audit
            .record_token_event(
                AuditEventType::Generated,
                &code,
                &subject.subject_id,
                Some(&request.client_id),
            )
            .await;

        let mut params = vec![("code", code.as_str())];
        if let Some(state) = &request.state {
            params.push(("state", state.as_str()));
        }
        Ok(append_query(&request.redirect_uri, &params))
    }

    fn seal_state(&self, request: &AuthorizeRequest, tenant_id: &str) -> Result<String, CoreError> {
        let state = AuthorizeState {
            request: request.clone(),
            tenant_id: tenant_id.to_string(),
            created_at: self.clock.now(),
        };
        let bytes = serde_json::to_vec(&state)
            .map_err(|e| StorageError::serialization(format!("encode state failed: {}", e)))?;
        Ok(self.codec.seal(STATE_AAD, &bytes)?)
    }

    /// Open and age-check a sealed state blob. Anything wrong with it is
    /// `invalid_state`.
    pub fn open_state(&self, blob: &str) -> Result<AuthorizeState, CoreError> {
        let bytes = self
            .codec
            .open(STATE_AAD, blob)
            .ok_or_else(|| FlowError::invalid_state("state blob failed integrity check"))?;
        let state: AuthorizeState = serde_json::from_slice(&bytes)
            .map_err(|_| FlowError::invalid_state("state blob does not parse"))?;

        let age = self.clock.now() - state.created_at;
        if age.num_seconds() > STATE_TTL_SECONDS {
            return Err(FlowError::invalid_state("state blob expired").into());
        }
        Ok(state)
    }
}

/// Append query parameters to a URL that may already carry a query string.
pub fn append_query(base: &str, params: &[(&str, &str)]) -> String {
    let query = serde_urlencoded::to_string(params).unwrap_or_default();
    if query.is_empty() {
        return base.to_string();
    }
    if base.contains('?') {
        format!("{}&{}", base, query)
    } else {
        format!("{}?{}", base, query)
    }
}

/// Error redirect back to the client, preserving `state`.
pub fn error_redirect(redirect_uri: &str, error: &str, description: &str, state: Option<&str>) -> String {
    let mut params = vec![("error", error), ("error_description", description)];
    if let Some(state) = state {
        params.push(("state", state));
    }
    append_query(redirect_uri, &params)
}
