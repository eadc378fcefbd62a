//! Port for the SQL mirror of browser and account sessions.
//!
//! The KV store is authoritative for hot-path reads; this mirror exists for
//! the admin queries the KV cannot answer (joins, filters, aggregates).
//! Mirror writes are best-effort: the session service retries once inline,
//! then counts and logs the failure without failing the operation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::error::StorageError;
use crate::core::session::{AccountSession, BrowserSession};

/// One row of `listUserSessions`: the account join target plus its browser
/// session context.
#[derive(Debug, Clone)]
pub struct UserSessionRow {
    pub browser: BrowserSession,
    pub account: AccountSession,
}

/// Aggregates for `getSessionStats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_browser_sessions: u64,
    pub total_account_sessions: u64,
    pub active_sessions_last_24h: u64,
    pub unique_users: u64,
}

/// Contract for the durable session mirror and its admin queries.
#[async_trait]
pub trait SessionMirror: Send + Sync {
    /// Insert-or-update a browser session row.
    async fn upsert_browser_session(&self, session: &BrowserSession) -> Result<(), StorageError>;

    /// Insert-or-update an account session row.
    async fn upsert_account_session(&self, account: &AccountSession) -> Result<(), StorageError>;

    /// Delete one account session row.
    async fn delete_account_session(
        &self,
        browser_session_id: &str,
        user_id: &str,
    ) -> Result<(), StorageError>;

    /// Delete a browser session and cascade to its account sessions.
    /// Returns the number of account sessions removed.
    async fn delete_browser_session(
        &self,
        session_id: &str,
        tenant_id: &str,
    ) -> Result<u64, StorageError>;

    /// Account sessions of a user joined with their browser sessions,
    /// tenant-scoped, newest first.
    async fn list_user_sessions(
        &self,
        user_id: &str,
        tenant_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserSessionRow>, StorageError>;

    /// Browser sessions of a tenant; `active_only` keeps sessions with
    /// activity in the last 7 days.
    async fn list_tenant_sessions(
        &self,
        tenant_id: &str,
        active_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BrowserSession>, StorageError>;

    /// Delete every browser session of a user in a tenant. Returns the
    /// number of browser sessions removed.
    async fn delete_user_sessions(
        &self,
        user_id: &str,
        tenant_id: &str,
    ) -> Result<u64, StorageError>;

    /// Browser sessions idle longer than `max_age_ms`.
    async fn expired_sessions(
        &self,
        max_age_ms: i64,
        limit: Option<i64>,
    ) -> Result<Vec<BrowserSession>, StorageError>;

    /// Remove sessions idle longer than `max_age_ms`. Returns rows removed.
    async fn cleanup_expired(&self, max_age_ms: i64) -> Result<u64, StorageError>;

    /// Aggregate counters, optionally scoped to one tenant.
    async fn session_stats(&self, tenant_id: Option<&str>) -> Result<SessionStats, StorageError>;
}
