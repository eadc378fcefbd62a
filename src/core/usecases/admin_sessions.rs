//! Use case: admin session management.
//!
//! SQL-backed queries the KV cannot answer: per-user and per-tenant
//! enumeration, revocation with cascade, expiry sweeps, and aggregate
//! statistics. Every query is tenant-scoped. Revocation also clears the KV
//! so the hot path stops honoring the session immediately.

use std::sync::Arc;

use tracing::warn;

use crate::core::error::{CoreError, SessionError};
use crate::core::session::BrowserSession;
use crate::core::usecases::ports::{
    storage_key, SessionMirror, SessionStats, Storage, UserSessionRow,
};

pub struct AdminSessionService {
    mirror: Arc<dyn SessionMirror>,
    storage: Arc<dyn Storage>,
}

impl AdminSessionService {
    pub fn new(mirror: Arc<dyn SessionMirror>, storage: Arc<dyn Storage>) -> Self {
        Self { mirror, storage }
    }

    /// Account sessions of a user joined with their browser sessions.
    pub async fn list_user_sessions(
        &self,
        user_id: &str,
        tenant_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserSessionRow>, CoreError> {
        Ok(self
            .mirror
            .list_user_sessions(user_id, tenant_id, limit, offset)
            .await?)
    }

    /// Browser sessions of a tenant; `active_only` keeps sessions with
    /// activity inside the last 7 days.
    pub async fn list_tenant_sessions(
        &self,
        tenant_id: &str,
        active_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BrowserSession>, CoreError> {
        Ok(self
            .mirror
            .list_tenant_sessions(tenant_id, active_only, limit, offset)
            .await?)
    }

    /// Revoke one browser session. Returns the number of account sessions
    /// that went with it.
    pub async fn revoke_session(
        &self,
        session_id: &str,
        tenant_id: &str,
    ) -> Result<u64, CoreError> {
        // Ownership first: the browser key is tenant-scoped, and the
        // mirror delete binds tenant_id. Account keys are only cleared
        // once one of the two confirms the session belongs here.
        let browser_key = storage_key(&["session", "browser", tenant_id, session_id]);
        let existed_in_kv = self.storage.remove(&browser_key).await?.is_some();
        let accounts_revoked = self.mirror.delete_browser_session(session_id, tenant_id).await?;

        if !existed_in_kv && accounts_revoked == 0 {
            return Err(SessionError::session_not_found(session_id).into());
        }

        let account_prefix = format!("session:account:{}:", session_id);
        let accounts = self.storage.scan(&account_prefix).await.unwrap_or_default();
        for (key, _) in &accounts {
            if let Err(e) = self.storage.remove(key).await {
                warn!(session_id, error = %e, "failed to clear account from KV");
            }
        }

        Ok(accounts_revoked.max(accounts.len() as u64))
    }

    /// Revoke every session of a user in a tenant. Returns browser sessions
    /// removed.
    pub async fn revoke_all_user_sessions(
        &self,
        user_id: &str,
        tenant_id: &str,
    ) -> Result<u64, CoreError> {
        // Enumerate from SQL, then clear each from the KV as well.
        let rows = self
            .mirror
            .list_user_sessions(user_id, tenant_id, 1000, 0)
            .await?;
        for row in &rows {
            let prefix = format!("session:account:{}:", row.browser.id);
            for (key, _) in self.storage.scan(&prefix).await.unwrap_or_default() {
                let _ = self.storage.remove(&key).await;
            }
            let browser_key = storage_key(&["session", "browser", tenant_id, &row.browser.id]);
            let _ = self.storage.remove(&browser_key).await;
        }

        Ok(self.mirror.delete_user_sessions(user_id, tenant_id).await?)
    }

    /// Browser sessions idle longer than `max_age_ms`.
    pub async fn get_expired_sessions(
        &self,
        max_age_ms: i64,
        limit: Option<i64>,
    ) -> Result<Vec<BrowserSession>, CoreError> {
        Ok(self.mirror.expired_sessions(max_age_ms, limit).await?)
    }

    /// Remove sessions idle longer than `max_age_ms` from SQL and KV.
    /// Returns rows removed from SQL.
    pub async fn cleanup_expired_sessions(&self, max_age_ms: i64) -> Result<u64, CoreError> {
        let expired = self.mirror.expired_sessions(max_age_ms, Some(1000)).await?;
        for session in &expired {
            let prefix = format!("session:account:{}:", session.id);
            for (key, _) in self.storage.scan(&prefix).await.unwrap_or_default() {
                let _ = self.storage.remove(&key).await;
            }
            let browser_key =
                storage_key(&["session", "browser", &session.tenant_id, &session.id]);
            let _ = self.storage.remove(&browser_key).await;
        }
        Ok(self.mirror.cleanup_expired(max_age_ms).await?)
    }

    /// Aggregate counters, optionally scoped to one tenant.
    pub async fn session_stats(
        &self,
        tenant_id: Option<&str>,
    ) -> Result<SessionStats, CoreError> {
        Ok(self.mirror.session_stats(tenant_id).await?)
    }
}
