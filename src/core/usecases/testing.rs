//! Shared in-memory test doubles for the use-case layer.
//!
//! Hand-rolled fakes over the ports, plus a fixture that wires the full
//! service graph against in-memory backends. Test-only.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::adapters::crypto::{AeadCodec, ClientSecretHasher, SigningKeyRing};
use crate::adapters::storage::MemoryStorage;
use crate::core::audit::AuditRecord;
use crate::core::error::{FlowError, StorageError};
use crate::core::oauth::{GrantType, OAuthClient};
use crate::core::rbac::{Permission, Role, UserRole};
use crate::core::session::{AccountSession, BrowserSession};
use crate::core::usecases::ports::{
    AuditFilter, AuditSink, ClientRegistry, PassthroughResponder, ProviderAction,
    ProviderIdentity, RbacRepository, ResolvedAccess, SessionMirror, SessionStats, Storage,
    SystemClock, UpstreamProvider, UserSessionRow,
};
use crate::core::usecases::{
    AuditService, AuthorizeFlow, BrowserSessionService, M2mService, ProviderBridge, RbacConfig,
    RbacService, SessionConfig, TokenGrantService, TokenTtlConfig,
};

/// SQL mirror replaced by hash maps. Honors tenant scoping the way the
/// real queries do.
#[derive(Default)]
pub struct InMemoryMirror {
    pub browsers: Mutex<HashMap<String, BrowserSession>>,
    /// keyed by (browser_session_id, user_id)
    pub accounts: Mutex<HashMap<(String, String), AccountSession>>,
}

#[async_trait]
impl SessionMirror for InMemoryMirror {
    async fn upsert_browser_session(&self, session: &BrowserSession) -> Result<(), StorageError> {
        self.browsers
            .lock()
            .unwrap()
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn upsert_account_session(&self, account: &AccountSession) -> Result<(), StorageError> {
        self.accounts.lock().unwrap().insert(
            (account.browser_session_id.clone(), account.user_id.clone()),
            account.clone(),
        );
        Ok(())
    }

    async fn delete_account_session(
        &self,
        browser_session_id: &str,
        user_id: &str,
    ) -> Result<(), StorageError> {
        self.accounts
            .lock()
            .unwrap()
            .remove(&(browser_session_id.to_string(), user_id.to_string()));
        Ok(())
    }

    async fn delete_browser_session(
        &self,
        session_id: &str,
        tenant_id: &str,
    ) -> Result<u64, StorageError> {
        let mut browsers = self.browsers.lock().unwrap();
        let owned = browsers
            .get(session_id)
            .map(|s| s.tenant_id == tenant_id)
            .unwrap_or(false);
        if !owned {
            return Ok(0);
        }
        browsers.remove(session_id);
        let mut accounts = self.accounts.lock().unwrap();
        let before = accounts.len();
        accounts.retain(|(sid, _), _| sid != session_id);
        Ok((before - accounts.len()) as u64)
    }

    async fn list_user_sessions(
        &self,
        user_id: &str,
        tenant_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserSessionRow>, StorageError> {
        let browsers = self.browsers.lock().unwrap();
        let accounts = self.accounts.lock().unwrap();
        let mut rows: Vec<UserSessionRow> = accounts
            .values()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| {
                browsers
                    .get(&a.browser_session_id)
                    .filter(|b| b.tenant_id == tenant_id)
                    .map(|b| UserSessionRow {
                        browser: b.clone(),
                        account: a.clone(),
                    })
            })
            .collect();
        rows.sort_by(|a, b| b.account.authenticated_at.cmp(&a.account.authenticated_at));
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn list_tenant_sessions(
        &self,
        tenant_id: &str,
        active_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BrowserSession>, StorageError> {
        let floor = Utc::now() - chrono::Duration::days(7);
        let mut rows: Vec<BrowserSession> = self
            .browsers
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.tenant_id == tenant_id)
            .filter(|b| !active_only || b.last_activity > floor)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn delete_user_sessions(
        &self,
        user_id: &str,
        tenant_id: &str,
    ) -> Result<u64, StorageError> {
        let affected: Vec<String> = {
            let browsers = self.browsers.lock().unwrap();
            self.accounts
                .lock()
                .unwrap()
                .values()
                .filter(|a| a.user_id == user_id)
                .filter(|a| {
                    browsers
                        .get(&a.browser_session_id)
                        .map(|b| b.tenant_id == tenant_id)
                        .unwrap_or(false)
                })
                .map(|a| a.browser_session_id.clone())
                .collect()
        };
        for session_id in &affected {
            self.delete_browser_session(session_id, tenant_id).await?;
        }
        Ok(affected.len() as u64)
    }

    async fn expired_sessions(
        &self,
        max_age_ms: i64,
        limit: Option<i64>,
    ) -> Result<Vec<BrowserSession>, StorageError> {
        let cutoff = Utc::now() - chrono::Duration::milliseconds(max_age_ms);
        let rows: Vec<BrowserSession> = self
            .browsers
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.last_activity < cutoff)
            .cloned()
            .take(limit.unwrap_or(1000).max(0) as usize)
            .collect();
        Ok(rows)
    }

    async fn cleanup_expired(&self, max_age_ms: i64) -> Result<u64, StorageError> {
        let cutoff = Utc::now() - chrono::Duration::milliseconds(max_age_ms);
        let stale: Vec<(String, String)> = {
            let browsers = self.browsers.lock().unwrap();
            browsers
                .values()
                .filter(|b| b.last_activity < cutoff)
                .map(|b| (b.id.clone(), b.tenant_id.clone()))
                .collect()
        };
        let mut removed = 0;
        for (session_id, tenant_id) in stale {
            self.delete_browser_session(&session_id, &tenant_id).await?;
            removed += 1;
        }
        Ok(removed)
    }

    async fn session_stats(&self, tenant_id: Option<&str>) -> Result<SessionStats, StorageError> {
        let browsers = self.browsers.lock().unwrap();
        let accounts = self.accounts.lock().unwrap();
        let in_scope = |tid: &str| tenant_id.map(|t| t == tid).unwrap_or(true);
        let floor = Utc::now() - chrono::Duration::hours(24);

        let total_browser_sessions =
            browsers.values().filter(|b| in_scope(&b.tenant_id)).count() as u64;
        let active_sessions_last_24h = browsers
            .values()
            .filter(|b| in_scope(&b.tenant_id) && b.last_activity > floor)
            .count() as u64;
        let scoped_accounts: Vec<&AccountSession> = accounts
            .values()
            .filter(|a| {
                browsers
                    .get(&a.browser_session_id)
                    .map(|b| in_scope(&b.tenant_id))
                    .unwrap_or(false)
            })
            .collect();
        let unique_users = scoped_accounts
            .iter()
            .map(|a| a.user_id.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len() as u64;

        Ok(SessionStats {
            total_browser_sessions,
            total_account_sessions: scoped_accounts.len() as u64,
            active_sessions_last_24h,
            unique_users,
        })
    }
}

/// Client registry replaced by a hash map.
#[derive(Default)]
pub struct StaticClients {
    pub clients: Mutex<HashMap<String, OAuthClient>>,
}

impl StaticClients {
    pub fn with(clients: Vec<OAuthClient>) -> Self {
        Self {
            clients: Mutex::new(
                clients
                    .into_iter()
                    .map(|c| (c.client_id.clone(), c))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl ClientRegistry for StaticClients {
    async fn get(&self, client_id: &str) -> Result<Option<OAuthClient>, StorageError> {
        Ok(self.clients.lock().unwrap().get(client_id).cloned())
    }

    async fn put(&self, client: &OAuthClient) -> Result<(), StorageError> {
        self.clients
            .lock()
            .unwrap()
            .insert(client.client_id.clone(), client.clone());
        Ok(())
    }

    async fn delete(&self, client_id: &str) -> Result<bool, StorageError> {
        Ok(self.clients.lock().unwrap().remove(client_id).is_some())
    }

    async fn list(&self, tenant_id: &str) -> Result<Vec<OAuthClient>, StorageError> {
        Ok(self
            .clients
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.tenant_id == tenant_id)
            .cloned()
            .collect())
    }
}

/// RBAC repository replaced by hash maps.
#[derive(Default)]
pub struct FakeRbacRepo {
    pub roles: Mutex<HashMap<String, Role>>,
    pub permissions: Mutex<HashMap<String, Permission>>,
    /// role_id -> permission ids
    pub grants: Mutex<HashMap<String, Vec<String>>>,
    pub assignments: Mutex<Vec<UserRole>>,
}

#[async_trait]
impl RbacRepository for FakeRbacRepo {
    async fn resolve_access(
        &self,
        tenant_id: &str,
        user_id: &str,
        client_id: &str,
    ) -> Result<ResolvedAccess, StorageError> {
        let now = Utc::now();
        let roles = self.roles.lock().unwrap();
        let permissions = self.permissions.lock().unwrap();
        let grants = self.grants.lock().unwrap();

        let mut role_names = Vec::new();
        let mut permission_names = Vec::new();
        for assignment in self.assignments.lock().unwrap().iter() {
            if assignment.tenant_id != tenant_id
                || assignment.user_id != user_id
                || !assignment.is_effective(now)
            {
                continue;
            }
            let Some(role) = roles.get(&assignment.role_id) else {
                continue;
            };
            role_names.push(role.name.clone());
            for permission_id in grants.get(&role.id).into_iter().flatten() {
                if let Some(p) = permissions.get(permission_id) {
                    if p.client_id == client_id {
                        permission_names.push(p.name.clone());
                    }
                }
            }
        }
        Ok(ResolvedAccess {
            roles: role_names,
            permissions: permission_names,
        })
    }

    async fn get_role(&self, role_id: &str) -> Result<Option<Role>, StorageError> {
        Ok(self.roles.lock().unwrap().get(role_id).cloned())
    }

    async fn list_roles(&self, tenant_id: &str) -> Result<Vec<Role>, StorageError> {
        Ok(self
            .roles
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn create_role(&self, role: &Role) -> Result<(), StorageError> {
        self.roles
            .lock()
            .unwrap()
            .insert(role.id.clone(), role.clone());
        Ok(())
    }

    async fn update_role(&self, role: &Role) -> Result<(), StorageError> {
        self.roles
            .lock()
            .unwrap()
            .insert(role.id.clone(), role.clone());
        Ok(())
    }

    async fn delete_role(&self, role_id: &str) -> Result<bool, StorageError> {
        self.grants.lock().unwrap().remove(role_id);
        self.assignments
            .lock()
            .unwrap()
            .retain(|a| a.role_id != role_id);
        Ok(self.roles.lock().unwrap().remove(role_id).is_some())
    }

    async fn get_permission(
        &self,
        permission_id: &str,
    ) -> Result<Option<Permission>, StorageError> {
        Ok(self.permissions.lock().unwrap().get(permission_id).cloned())
    }

    async fn list_permissions(&self, client_id: &str) -> Result<Vec<Permission>, StorageError> {
        Ok(self
            .permissions
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.client_id == client_id)
            .cloned()
            .collect())
    }

    async fn create_permission(&self, permission: &Permission) -> Result<(), StorageError> {
        self.permissions
            .lock()
            .unwrap()
            .insert(permission.id.clone(), permission.clone());
        Ok(())
    }

    async fn update_permission(&self, permission: &Permission) -> Result<(), StorageError> {
        self.permissions
            .lock()
            .unwrap()
            .insert(permission.id.clone(), permission.clone());
        Ok(())
    }

    async fn delete_permission(&self, permission_id: &str) -> Result<bool, StorageError> {
        for grants in self.grants.lock().unwrap().values_mut() {
            grants.retain(|id| id != permission_id);
        }
        Ok(self
            .permissions
            .lock()
            .unwrap()
            .remove(permission_id)
            .is_some())
    }

    async fn assign_role(&self, assignment: &UserRole) -> Result<(), StorageError> {
        let mut assignments = self.assignments.lock().unwrap();
        assignments.retain(|a| {
            !(a.user_id == assignment.user_id
                && a.role_id == assignment.role_id
                && a.tenant_id == assignment.tenant_id)
        });
        assignments.push(assignment.clone());
        Ok(())
    }

    async fn unassign_role(
        &self,
        tenant_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<bool, StorageError> {
        let mut assignments = self.assignments.lock().unwrap();
        let before = assignments.len();
        assignments.retain(|a| {
            !(a.tenant_id == tenant_id && a.user_id == user_id && a.role_id == role_id)
        });
        Ok(assignments.len() < before)
    }

    async fn user_role_names(
        &self,
        tenant_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, StorageError> {
        let roles = self.roles.lock().unwrap();
        Ok(self
            .assignments
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.tenant_id == tenant_id && a.user_id == user_id && a.is_effective(now))
            .filter_map(|a| roles.get(&a.role_id).map(|r| r.name.clone()))
            .collect())
    }

    async fn grant_permission_to_role(
        &self,
        role_id: &str,
        permission_id: &str,
    ) -> Result<(), StorageError> {
        let mut grants = self.grants.lock().unwrap();
        let entry = grants.entry(role_id.to_string()).or_default();
        if !entry.iter().any(|id| id == permission_id) {
            entry.push(permission_id.to_string());
        }
        Ok(())
    }

    async fn revoke_permission_from_role(
        &self,
        role_id: &str,
        permission_id: &str,
    ) -> Result<bool, StorageError> {
        let mut grants = self.grants.lock().unwrap();
        let Some(entry) = grants.get_mut(role_id) else {
            return Ok(false);
        };
        let before = entry.len();
        entry.retain(|id| id != permission_id);
        Ok(entry.len() < before)
    }

    async fn users_with_role(&self, role_id: &str) -> Result<Vec<String>, StorageError> {
        let mut users: Vec<String> = self
            .assignments
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.role_id == role_id)
            .map(|a| a.user_id.clone())
            .collect();
        users.sort();
        users.dedup();
        Ok(users)
    }
}

/// Audit sink capturing everything in memory.
#[derive(Default)]
pub struct MemoryAuditSink {
    pub records: Mutex<Vec<AuditRecord>>,
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn insert(&self, record: &AuditRecord) -> Result<(), StorageError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn insert_batch(&self, records: &[AuditRecord]) -> Result<(), StorageError> {
        self.records.lock().unwrap().extend_from_slice(records);
        Ok(())
    }

    async fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>, StorageError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                filter.subject.as_deref().map(|s| r.subject == s).unwrap_or(true)
                    && filter
                        .event_type
                        .map(|e| r.event_type == e)
                        .unwrap_or(true)
            })
            .cloned()
            .collect())
    }

    async fn cleanup(&self, _retention_days: i64) -> Result<u64, StorageError> {
        Ok(0)
    }
}

/// Provider that trusts a `user` callback parameter. Good enough to drive
/// the bridge and completion paths.
pub struct TrustingProvider;

#[async_trait]
impl UpstreamProvider for TrustingProvider {
    fn name(&self) -> &str {
        "trusting"
    }

    fn kind(&self) -> &str {
        "test"
    }

    async fn begin(&self, state: &str) -> Result<ProviderAction, FlowError> {
        Ok(ProviderAction::Redirect {
            url: format!("https://upstream.example/auth?state={}", state),
        })
    }

    async fn callback(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<(ProviderIdentity, String), FlowError> {
        let user = params
            .get("user")
            .cloned()
            .ok_or_else(|| FlowError::provider_error("no user parameter"))?;
        let identity = ProviderIdentity {
            subject_type: "user".to_string(),
            subject_id: user.clone(),
            properties: serde_json::json!({
                "email": format!("{}@example.com", user),
            }),
            roles: vec![],
            permissions: vec![],
        };
        let state = params.get("state").cloned().unwrap_or_default();
        Ok((identity, state))
    }
}

/// The full service graph over in-memory backends.
pub struct Fixture {
    pub storage: Arc<MemoryStorage>,
    pub mirror: Arc<InMemoryMirror>,
    pub clients: Arc<StaticClients>,
    pub rbac_repo: Arc<FakeRbacRepo>,
    pub audit_sink: Arc<MemoryAuditSink>,
    pub sessions: Arc<BrowserSessionService>,
    pub rbac: Arc<RbacService>,
    pub audit: Arc<AuditService>,
    pub signer: Arc<SigningKeyRing>,
    pub secrets: Arc<ClientSecretHasher>,
    pub codec: Arc<AeadCodec>,
    pub bridge: Arc<ProviderBridge>,
    pub m2m: Arc<M2mService>,
    pub flow: Arc<AuthorizeFlow>,
    pub grants: Arc<TokenGrantService>,
}

pub const TEST_ISSUER: &str = "https://issuer.example.com";
pub const TEST_TENANT: &str = "acme";

/// A confidential client registered for every grant.
pub fn test_client(secret_hash: Option<String>) -> OAuthClient {
    OAuthClient {
        client_id: "app-1".to_string(),
        client_secret_hash: secret_hash,
        redirect_uris: vec!["https://app/cb".to_string()],
        grant_types: vec![
            GrantType::AuthorizationCode,
            GrantType::RefreshToken,
            GrantType::ClientCredentials,
        ],
        scopes: vec!["read".to_string(), "write".to_string()],
        tenant_id: TEST_TENANT.to_string(),
    }
}

pub fn fixture() -> Fixture {
    fixture_with_clients(vec![test_client(None)])
}

pub fn fixture_with_clients(client_list: Vec<OAuthClient>) -> Fixture {
    let storage = Arc::new(MemoryStorage::new());
    let mirror = Arc::new(InMemoryMirror::default());
    let clients = Arc::new(StaticClients::with(client_list));
    let rbac_repo = Arc::new(FakeRbacRepo::default());
    let audit_sink = Arc::new(MemoryAuditSink::default());
    let clock = Arc::new(SystemClock);

    let sessions = Arc::new(BrowserSessionService::new(
        storage.clone() as Arc<dyn Storage>,
        mirror.clone(),
        clock.clone(),
        SessionConfig::default(),
    ));
    let rbac = Arc::new(RbacService::new(
        storage.clone() as Arc<dyn Storage>,
        rbac_repo.clone(),
        clock.clone(),
        RbacConfig::default(),
    ));
    let audit = Arc::new(AuditService::direct(audit_sink.clone()));
    let signer = Arc::new(SigningKeyRing::generate().unwrap());
    let secrets = Arc::new(ClientSecretHasher::new().unwrap());
    let codec = Arc::new(AeadCodec::new(&[9u8; 32]).unwrap());
    let bridge = Arc::new(ProviderBridge::new(Duration::from_secs(5)));
    bridge.register(Arc::new(TrustingProvider));
    let m2m = Arc::new(M2mService::new(signer.clone(), TEST_ISSUER));

    let flow = Arc::new(AuthorizeFlow::new(
        sessions.clone(),
        rbac.clone(),
        clients.clone(),
        codec.clone(),
        bridge.clone(),
        Arc::new(PassthroughResponder),
        storage.clone() as Arc<dyn Storage>,
        audit.clone(),
        clock.clone(),
        TokenTtlConfig::default(),
    ));
    let grants = Arc::new(TokenGrantService::new(
        storage.clone() as Arc<dyn Storage>,
        signer.clone(),
        clients.clone(),
        secrets.clone(),
        audit.clone(),
        m2m.clone(),
        TEST_ISSUER,
    ));

    Fixture {
        storage,
        mirror,
        clients,
        rbac_repo,
        audit_sink,
        sessions,
        rbac,
        audit,
        signer,
        secrets,
        codec,
        bridge,
        m2m,
        flow,
        grants,
    }
}
