//! Use case: browser-session state machine.
//!
//! Orchestrates the multi-account browser session: creation, account
//! add/switch/remove, eviction at the cap, and destruction.
//!
//! Storage discipline is dual-write: the KV write is primary and decides
//! the outcome; the SQL mirror write is best-effort, retried once inline,
//! then counted and logged. Hot-path reads (`get_browser_session`,
//! `list_accounts`) consult the KV only.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::core::error::{CoreError, SessionError, StorageError};
use crate::core::session::{
    eviction_candidate, promotion_candidate, AccountSession, BrowserSession, NewAccount,
};
use crate::core::usecases::ports::{storage_key, Clock, SessionMirror, Storage};

/// Session-service tuning; defaults match the issuer contract.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Absolute browser-session lifetime (default 7 days)
    pub lifetime_seconds: i64,
    /// Sliding-window extension granted per request
    pub sliding_window_seconds: i64,
    /// Cap on distinct accounts per browser session
    pub max_accounts_per_session: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime_seconds: 7 * 24 * 3600,
            sliding_window_seconds: 24 * 3600,
            max_accounts_per_session: 3,
        }
    }
}

/// Multi-account browser-session service.
pub struct BrowserSessionService {
    storage: Arc<dyn Storage>,
    mirror: Arc<dyn SessionMirror>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    mirror_failures: AtomicU64,
}

impl BrowserSessionService {
    pub fn new(
        storage: Arc<dyn Storage>,
        mirror: Arc<dyn SessionMirror>,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
    ) -> Self {
        Self {
            storage,
            mirror,
            clock,
            config,
            mirror_failures: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Mirror write failures since startup (both attempts failed).
    pub fn mirror_failure_count(&self) -> u64 {
        self.mirror_failures.load(Ordering::Relaxed)
    }

    fn browser_key(tenant_id: &str, session_id: &str) -> String {
        storage_key(&["session", "browser", tenant_id, session_id])
    }

    fn account_key(session_id: &str, user_id: &str) -> String {
        storage_key(&["session", "account", session_id, user_id])
    }

    fn account_prefix(session_id: &str) -> String {
        format!("session:account:{}:", session_id)
    }

    async fn write_browser(&self, session: &BrowserSession) -> Result<(), StorageError> {
        let now = self.clock.now();
        let ttl = Duration::from_secs(session.ttl_seconds(now).max(1));
        let value = serde_json::to_value(session)
            .map_err(|e| StorageError::serialization(format!("encode session failed: {}", e)))?;
        self.storage
            .set(&Self::browser_key(&session.tenant_id, &session.id), value, Some(ttl))
            .await?;

        self.mirror_browser(session).await;
        Ok(())
    }

    async fn write_account(&self, account: &AccountSession) -> Result<(), StorageError> {
        let now = self.clock.now();
        let ttl = (account.expires_at - now).num_seconds().max(1) as u64;
        let value = serde_json::to_value(account)
            .map_err(|e| StorageError::serialization(format!("encode account failed: {}", e)))?;
        self.storage
            .set(
                &Self::account_key(&account.browser_session_id, &account.user_id),
                value,
                Some(Duration::from_secs(ttl)),
            )
            .await?;

        self.mirror_account(account).await;
        Ok(())
    }

    async fn mirror_browser(&self, session: &BrowserSession) {
        let first = self.mirror.upsert_browser_session(session).await;
        if first.is_err() {
            if let Err(e) = self.mirror.upsert_browser_session(session).await {
                self.mirror_failures.fetch_add(1, Ordering::Relaxed);
                warn!(session_id = %session.id, error = %e, "session mirror write failed");
            }
        }
    }

    async fn mirror_account(&self, account: &AccountSession) {
        let first = self.mirror.upsert_account_session(account).await;
        if first.is_err() {
            if let Err(e) = self.mirror.upsert_account_session(account).await {
                self.mirror_failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    session_id = %account.browser_session_id,
                    user_id = %account.user_id,
                    error = %e,
                    "account mirror write failed"
                );
            }
        }
    }

    async fn mirror_account_delete(&self, session_id: &str, user_id: &str) {
        let first = self.mirror.delete_account_session(session_id, user_id).await;
        if first.is_err() {
            if let Err(e) = self.mirror.delete_account_session(session_id, user_id).await {
                self.mirror_failures.fetch_add(1, Ordering::Relaxed);
                warn!(session_id, user_id, error = %e, "account mirror delete failed");
            }
        }
    }

    /// Create a fresh browser session and dual-write it.
    pub async fn create_browser_session(
        &self,
        tenant_id: &str,
        user_agent: &str,
        ip_address: &str,
    ) -> Result<BrowserSession, CoreError> {
        let session =
            BrowserSession::new(tenant_id, user_agent, ip_address, self.config.lifetime_seconds);
        self.write_browser(&session).await?;
        Ok(session)
    }

    /// Hot-path read; KV only. Expired entries read as absent.
    pub async fn get_browser_session(
        &self,
        session_id: &str,
        tenant_id: &str,
    ) -> Result<Option<BrowserSession>, CoreError> {
        let value = self
            .storage
            .get(&Self::browser_key(tenant_id, session_id))
            .await?;
        match value {
            Some(value) => {
                let session: BrowserSession = serde_json::from_value(value).map_err(|e| {
                    StorageError::serialization(format!("corrupt session record: {}", e))
                })?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    /// Sliding-window refresh on a served request: extend up to the
    /// absolute bound fixed at creation.
    pub async fn touch(&self, session: &mut BrowserSession) -> Result<(), CoreError> {
        let now = self.clock.now();
        let absolute_bound =
            session.created_at + chrono::Duration::seconds(self.config.lifetime_seconds);
        session.touch(now, self.config.sliding_window_seconds, absolute_bound);
        self.write_browser(session).await?;
        Ok(())
    }

    /// Hot-path account listing; KV only.
    pub async fn list_accounts(
        &self,
        session_id: &str,
    ) -> Result<Vec<AccountSession>, CoreError> {
        let hits = self.storage.scan(&Self::account_prefix(session_id)).await?;
        let mut accounts = Vec::with_capacity(hits.len());
        for (_, value) in hits {
            let account: AccountSession = serde_json::from_value(value).map_err(|e| {
                StorageError::serialization(format!("corrupt account record: {}", e))
            })?;
            accounts.push(account);
        }
        Ok(accounts)
    }

    /// Add an account (or re-authenticate one already present) and make it
    /// active. At the cap, the least-recently-authenticated non-active
    /// account is evicted first.
    pub async fn add_account_to_session(
        &self,
        session: &BrowserSession,
        input: NewAccount,
    ) -> Result<(AccountSession, BrowserSession), CoreError> {
        let mut accounts = self.list_accounts(&session.id).await?;
        let now = self.clock.now();

        let existing_idx = accounts.iter().position(|a| a.user_id == input.user_id);

        if existing_idx.is_none() && accounts.len() >= self.config.max_accounts_per_session {
            if let Some(victim) = eviction_candidate(&accounts) {
                let victim_user = victim.user_id.clone();
                self.storage
                    .remove(&Self::account_key(&session.id, &victim_user))
                    .await?;
                self.mirror_account_delete(&session.id, &victim_user).await;
                accounts.retain(|a| a.user_id != victim_user);
            }
        }

        // Deactivate whichever account was active before.
        for account in accounts.iter_mut().filter(|a| a.is_active) {
            account.is_active = false;
            self.write_account(account).await?;
        }

        let mut account = match existing_idx {
            Some(idx) => {
                // Same user re-authenticating: update the row in place.
                let mut account = accounts[idx].clone();
                account.subject_type = input.subject_type;
                account.subject_properties = input.subject_properties;
                account.client_id = input.client_id;
                account.refresh_token = input.refresh_token;
                account.authenticated_at = now;
                account.expires_at = now + chrono::Duration::seconds(input.ttl_seconds);
                account
            }
            None => AccountSession::from_new(&session.id, input),
        };
        account.is_active = true;
        self.write_account(&account).await?;

        let mut session = session.clone();
        session.active_user_id = Some(account.user_id.clone());
        session.last_activity = now;
        session.version += 1;
        self.write_browser(&session).await?;

        Ok((account, session))
    }

    /// Make an in-session account the active one.
    pub async fn switch_active_account(
        &self,
        session: &BrowserSession,
        user_id: &str,
    ) -> Result<BrowserSession, CoreError> {
        let accounts = self.list_accounts(&session.id).await?;
        if !accounts.iter().any(|a| a.user_id == user_id) {
            return Err(SessionError::account_not_found(user_id).into());
        }

        for mut account in accounts {
            let should_be_active = account.user_id == user_id;
            if account.is_active != should_be_active {
                account.is_active = should_be_active;
                self.write_account(&account).await?;
            }
        }

        let mut session = session.clone();
        session.active_user_id = Some(user_id.to_string());
        session.version += 1;
        self.write_browser(&session).await?;
        Ok(session)
    }

    /// Remove an account. Removing the active account promotes the most
    /// recently authenticated remaining one; with none left, the active
    /// pointer clears.
    pub async fn remove_account(
        &self,
        session: &BrowserSession,
        user_id: &str,
    ) -> Result<BrowserSession, CoreError> {
        let removed = self
            .storage
            .remove(&Self::account_key(&session.id, user_id))
            .await?;
        if removed.is_none() {
            return Err(SessionError::account_not_found(user_id).into());
        }
        self.mirror_account_delete(&session.id, user_id).await;

        let mut session = session.clone();
        if session.active_user_id.as_deref() == Some(user_id) {
            let remaining = self.list_accounts(&session.id).await?;
            let promoted_user = promotion_candidate(&remaining).map(|a| a.user_id.clone());
            session.active_user_id = promoted_user.clone();
            if let Some(promoted_user) = promoted_user {
                for mut account in remaining {
                    let should_be_active = account.user_id == promoted_user;
                    if account.is_active != should_be_active {
                        account.is_active = should_be_active;
                        self.write_account(&account).await?;
                    }
                }
            }
        }
        session.version += 1;
        self.write_browser(&session).await?;
        Ok(session)
    }

    /// Remove every account, leaving the browser session empty.
    pub async fn remove_all_accounts(
        &self,
        session: &BrowserSession,
    ) -> Result<BrowserSession, CoreError> {
        let accounts = self.list_accounts(&session.id).await?;
        for account in &accounts {
            self.storage
                .remove(&Self::account_key(&session.id, &account.user_id))
                .await?;
            self.mirror_account_delete(&session.id, &account.user_id).await;
        }

        let mut session = session.clone();
        session.active_user_id = None;
        session.version += 1;
        self.write_browser(&session).await?;
        Ok(session)
    }

    /// Destroy the browser session and everything in it.
    pub async fn destroy_browser_session(
        &self,
        session_id: &str,
        tenant_id: &str,
    ) -> Result<(), CoreError> {
        let accounts = self.list_accounts(session_id).await?;
        for account in &accounts {
            self.storage
                .remove(&Self::account_key(session_id, &account.user_id))
                .await?;
        }
        self.storage
            .remove(&Self::browser_key(tenant_id, session_id))
            .await?;

        if let Err(e) = self.mirror.delete_browser_session(session_id, tenant_id).await {
            self.mirror_failures.fetch_add(1, Ordering::Relaxed);
            warn!(session_id, error = %e, "session mirror destroy failed");
        }
        Ok(())
    }
}
