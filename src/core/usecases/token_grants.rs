//! Use case: the `/token` endpoint grants.
//!
//! Three grants:
//! - `authorization_code`: one-shot: the code record is removed atomically
//!   on redemption, so two racing redemptions admit at most one winner.
//!   PKCE `S256` is verified when the code carries a challenge.
//! - `refresh_token`: rotating: the presented token must be the current
//!   family head. Presenting anything older revokes the whole family and
//!   audits a `reused` event.
//! - `client_credentials`: delegates to the M2M subsystem after client
//!   authentication and scope checks.
//!
//! Client authentication runs the decoy path for unknown clients so timing
//! does not reveal client existence.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::core::audit::AuditEventType;
use crate::core::error::{CoreError, FlowError, StorageError};
use crate::core::oauth::{
    verify_pkce_s256, AuthorizationCode, GrantType, OAuthClient, RefreshTokenRecord, Subject,
};
use crate::core::token::{AccessClaims, M2mConfig};
use crate::core::usecases::audit_service::AuditService;
use crate::core::usecases::m2m_service::M2mService;
use crate::core::usecases::ports::{
    storage_key, ClientRegistry, SecretVerifier, Storage, TokenSigner,
};

/// Parsed `/token` form body.
#[derive(Debug, Clone, Default)]
pub struct TokenRequest {
    pub grant_type: String,
    pub code: Option<String>,
    pub redirect_uri: Option<String>,
    pub code_verifier: Option<String>,
    pub refresh_token: Option<String>,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub scope: Option<String>,
}

/// Successful `/token` response body.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

pub struct TokenGrantService {
    storage: Arc<dyn Storage>,
    signer: Arc<dyn TokenSigner>,
    clients: Arc<dyn ClientRegistry>,
    secrets: Arc<dyn SecretVerifier>,
    audit: Arc<AuditService>,
    m2m: Arc<M2mService>,
    issuer: String,
}

impl TokenGrantService {
    pub fn new(
        storage: Arc<dyn Storage>,
        signer: Arc<dyn TokenSigner>,
        clients: Arc<dyn ClientRegistry>,
        secrets: Arc<dyn SecretVerifier>,
        audit: Arc<AuditService>,
        m2m: Arc<M2mService>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            signer,
            clients,
            secrets,
            audit,
            m2m,
            issuer: issuer.into(),
        }
    }

    /// Dispatch a `/token` request by grant type.
    pub async fn token(
        &self,
        request: TokenRequest,
        tenant_id: &str,
    ) -> Result<TokenResponse, CoreError> {
        match request.grant_type.as_str() {
            "authorization_code" => self.redeem_code(request, tenant_id).await,
            "refresh_token" => self.rotate_refresh(request, tenant_id).await,
            "client_credentials" => self.client_credentials(request, tenant_id).await,
            other => Err(FlowError::unsupported_grant_type(other).into()),
        }
    }

    /// Authenticate the caller as a registered client of this tenant.
    /// Unknown clients still cost one secret verification (decoy).
    async fn authenticate_client(
        &self,
        client_id: &str,
        client_secret: Option<&str>,
        tenant_id: &str,
        grant: GrantType,
    ) -> Result<OAuthClient, CoreError> {
        let client = match self
            .clients
            .get(client_id)
            .await?
            .filter(|c| c.tenant_id == tenant_id)
        {
            Some(client) => {
                if client.is_confidential() {
                    let presented = client_secret.unwrap_or("");
                    if !self
                        .secrets
                        .verify_or_decoy(presented, client.client_secret_hash.as_deref())
                    {
                        return Err(
                            FlowError::invalid_client("client authentication failed").into()
                        );
                    }
                }
                client
            }
            None => {
                // Burn the same work as a real verification before failing.
                let _ = self
                    .secrets
                    .verify_or_decoy(client_secret.unwrap_or(""), None);
                return Err(FlowError::invalid_client("client authentication failed").into());
            }
        };

        if !client.allows_grant(grant) {
            return Err(FlowError::unauthorized_client(format!(
                "grant {} not allowed for client",
                grant.as_str()
            ))
            .into());
        }
        Ok(client)
    }

    async fn redeem_code(
        &self,
        request: TokenRequest,
        tenant_id: &str,
    ) -> Result<TokenResponse, CoreError> {
        let client = self
            .authenticate_client(
                &request.client_id,
                request.client_secret.as_deref(),
                tenant_id,
                GrantType::AuthorizationCode,
            )
            .await?;

        let code = request
            .code
            .as_deref()
            .ok_or_else(|| FlowError::invalid_request("code is required"))?;

        // One-shot: remove decides the race. Whoever gets the record wins;
        // everyone else sees invalid_grant.
        let record = self
            .storage
            .remove(&storage_key(&["oauth", "code", code]))
            .await?
            .ok_or_else(|| FlowError::invalid_grant("authorization code is unknown or expired"))?;
        let record: AuthorizationCode = serde_json::from_value(record)
            .map_err(|e| StorageError::serialization(format!("corrupt code record: {}", e)))?;

        if record.client_id != client.client_id || record.tenant_id != tenant_id {
            return Err(FlowError::invalid_grant("authorization code does not match client").into());
        }
        if let Some(redirect_uri) = &request.redirect_uri {
            if redirect_uri != &record.redirect_uri {
                return Err(FlowError::invalid_grant("redirect_uri does not match").into());
            }
        }
        if let Some(pkce) = &record.pkce {
            let verifier = request
                .code_verifier
                .as_deref()
                .ok_or_else(|| FlowError::invalid_request("code_verifier is required"))?;
            if !verify_pkce_s256(verifier, &pkce.challenge) {
                return Err(FlowError::invalid_grant("PKCE verification failed").into());
            }
        }

        // Root of a new refresh-token family.
        let refresh = RefreshTokenRecord::root(
            client.client_id.clone(),
            record.subject.clone(),
            record.refresh_ttl_seconds,
            record.access_ttl_seconds,
            record.scope.clone(),
            record.audience.clone(),
        );
        self.store_refresh(&refresh).await?;

        let access_token = self.mint_access(
            &record.subject,
            tenant_id,
            record.audience.clone(),
            record.nonce.clone(),
            record.access_ttl_seconds,
            &refresh.token_id,
        )?;

        self.audit
            .record_token_event(
                AuditEventType::Generated,
                &refresh.token_id,
                &record.subject.subject_id,
                Some(&client.client_id),
            )
            .await;

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: record.access_ttl_seconds,
            refresh_token: Some(wire_refresh_token(&record.subject.subject_id, &refresh.token_id)),
            scope: record.scope,
        })
    }

    async fn rotate_refresh(
        &self,
        request: TokenRequest,
        tenant_id: &str,
    ) -> Result<TokenResponse, CoreError> {
        let client = self
            .authenticate_client(
                &request.client_id,
                request.client_secret.as_deref(),
                tenant_id,
                GrantType::RefreshToken,
            )
            .await?;

        let wire = request
            .refresh_token
            .as_deref()
            .ok_or_else(|| FlowError::invalid_request("refresh_token is required"))?;
        let (subject_id, token_id) = parse_wire_refresh_token(wire)
            .ok_or_else(|| FlowError::invalid_grant("refresh token is malformed"))?;

        let key = storage_key(&["oauth", "refresh", subject_id, token_id]);
        match self.storage.remove(&key).await? {
            Some(value) => {
                let record: RefreshTokenRecord = serde_json::from_value(value).map_err(|e| {
                    StorageError::serialization(format!("corrupt refresh record: {}", e))
                })?;
                if record.client_id != client.client_id {
                    return Err(FlowError::invalid_grant("refresh token does not match client").into());
                }

                let rotated = record.rotate();
                self.store_refresh(&rotated).await?;

                let access_token = self.mint_access(
                    &rotated.subject,
                    tenant_id,
                    rotated.audience.clone(),
                    None,
                    rotated.access_ttl_seconds,
                    &rotated.token_id,
                )?;

                self.audit
                    .record_token_event(
                        AuditEventType::Refreshed,
                        &rotated.token_id,
                        &rotated.subject.subject_id,
                        Some(&client.client_id),
                    )
                    .await;

                Ok(TokenResponse {
                    access_token,
                    token_type: "Bearer".to_string(),
                    expires_in: rotated.access_ttl_seconds,
                    refresh_token: Some(wire_refresh_token(
                        &rotated.subject.subject_id,
                        &rotated.token_id,
                    )),
                    scope: rotated.scope.clone(),
                })
            }
            None => {
                // Unknown token id. If the subject still has live family
                // members, this is a replay of a rotated-out token: revoke
                // the entire family.
                let prefix = format!("oauth:refresh:{}:", subject_id);
                let family = self.storage.scan(&prefix).await?;
                if !family.is_empty() {
                    for (key, _) in family {
                        let _ = self.storage.remove(&key).await?;
                    }
                    self.audit
                        .record_token_event(
                            AuditEventType::Reused,
                            token_id,
                            subject_id,
                            Some(&client.client_id),
                        )
                        .await;
                }
                Err(FlowError::invalid_grant("refresh token is no longer valid").into())
            }
        }
    }

    async fn client_credentials(
        &self,
        request: TokenRequest,
        tenant_id: &str,
    ) -> Result<TokenResponse, CoreError> {
        let client = self
            .authenticate_client(
                &request.client_id,
                request.client_secret.as_deref(),
                tenant_id,
                GrantType::ClientCredentials,
            )
            .await?;
        if !client.is_confidential() {
            return Err(
                FlowError::unauthorized_client("client_credentials requires a client secret").into(),
            );
        }

        let requested: Vec<String> = request
            .scope
            .as_deref()
            .unwrap_or("")
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if let Some(outside) = requested.iter().find(|s| !client.scopes.contains(s)) {
            return Err(FlowError::invalid_request(format!(
                "scope {} is not registered for client",
                outside
            ))
            .into());
        }

        let issued = self.m2m.generate_m2m_token(
            &client.client_id,
            Some(tenant_id),
            &requested,
            &M2mConfig::default(),
        )?;

        self.audit
            .record_token_event(
                AuditEventType::Generated,
                &issued.jti,
                &client.client_id,
                Some(&client.client_id),
            )
            .await;

        Ok(TokenResponse {
            access_token: issued.access_token,
            token_type: "Bearer".to_string(),
            expires_in: issued.expires_in,
            refresh_token: None,
            scope: request.scope,
        })
    }

    fn mint_access(
        &self,
        subject: &Subject,
        tenant_id: &str,
        audience: Option<String>,
        nonce: Option<String>,
        ttl_seconds: u64,
        token_id: &str,
    ) -> Result<String, CoreError> {
        let iat = Utc::now().timestamp();
        let claims = AccessClaims {
            iss: self.issuer.clone(),
            sub: subject.subject_id.clone(),
            aud: audience,
            exp: iat + ttl_seconds as i64,
            iat,
            jti: Some(token_id.to_string()),
            nonce,
            roles: subject.roles(),
            permissions: subject.permissions(),
            tenant_id: tenant_id.to_string(),
            mode: "access".to_string(),
        };
        Ok(self.signer.sign_access(&claims)?)
    }

    async fn store_refresh(&self, record: &RefreshTokenRecord) -> Result<(), CoreError> {
        let key = storage_key(&["oauth", "refresh", &record.subject.subject_id, &record.token_id]);
        let value = serde_json::to_value(record)
            .map_err(|e| StorageError::serialization(format!("encode refresh failed: {}", e)))?;
        self.storage
            .set(&key, value, Some(Duration::from_secs(record.ttl_seconds)))
            .await?;
        Ok(())
    }

    /// `/userinfo`: verify the access token and project its claims.
    pub async fn userinfo(&self, bearer: &str) -> Result<serde_json::Value, CoreError> {
        let claims = self.signer.verify_access(bearer)?;
        Ok(serde_json::json!({
            "sub": claims.sub,
            "tenant_id": claims.tenant_id,
            "roles": claims.roles,
            "permissions": claims.permissions,
        }))
    }
}

/// Wire form of an OAuth refresh token: `subject:tokenId`. Token ids are
/// UUIDs, so splitting on the last `:` is unambiguous.
pub fn wire_refresh_token(subject_id: &str, token_id: &str) -> String {
    format!("{}:{}", subject_id, token_id)
}

fn parse_wire_refresh_token(wire: &str) -> Option<(&str, &str)> {
    let (subject_id, token_id) = wire.rsplit_once(':')?;
    if subject_id.is_empty() || token_id.is_empty() {
        return None;
    }
    Some((subject_id, token_id))
}
