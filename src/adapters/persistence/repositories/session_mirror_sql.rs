/// SQL-backed implementation of the session mirror.
///
/// Implements operations against the `browser_sessions` and
/// `account_sessions` tables. The KV store stays authoritative for hot-path
/// reads; this mirror answers the admin queries (joins, filters,
/// aggregates) the KV cannot.
///
/// Responsibilities:
/// - Upsert browser and account session rows on every dual-write
/// - Cascade deletes from browser sessions to their accounts
/// - Tenant-scoped enumeration for the admin surface
/// - Expiry sweeps and aggregate statistics
///
/// Does NOT:
/// - Decide session semantics (eviction, promotion: the session service does)
/// - Serve hot-path reads

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::Row;

use crate::adapters::persistence::database::Database;
use crate::adapters::persistence::models::{AccountSessionRow, BrowserSessionRow};
use crate::core::error::StorageError;
use crate::core::session::{AccountSession, BrowserSession};
use crate::core::usecases::ports::{SessionMirror, SessionStats, UserSessionRow};

pub struct SessionMirrorSql {
    db: Database,
}

impl SessionMirrorSql {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn query_failed(what: &str, e: sqlx::Error) -> StorageError {
        StorageError::unavailable(format!("{}: {}", what, e))
    }
}

#[async_trait]
impl SessionMirror for SessionMirrorSql {
    async fn upsert_browser_session(&self, session: &BrowserSession) -> Result<(), StorageError> {
        const QUERY: &str = r#"
            INSERT INTO browser_sessions
            (id, tenant_id, created_at, last_activity, expires_at, user_agent, ip_address, active_user_id, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                last_activity = EXCLUDED.last_activity,
                expires_at = EXCLUDED.expires_at,
                active_user_id = EXCLUDED.active_user_id,
                version = EXCLUDED.version
        "#;

        sqlx::query(QUERY)
            .bind(&session.id)
            .bind(&session.tenant_id)
            .bind(session.created_at)
            .bind(session.last_activity)
            .bind(session.expires_at)
            .bind(&session.user_agent)
            .bind(&session.ip_address)
            .bind(&session.active_user_id)
            .bind(session.version as i64)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to upsert browser session", e))?;

        Ok(())
    }

    async fn upsert_account_session(&self, account: &AccountSession) -> Result<(), StorageError> {
        const QUERY: &str = r#"
            INSERT INTO account_sessions
            (id, browser_session_id, user_id, subject_type, subject_properties, client_id,
             refresh_token, authenticated_at, expires_at, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (browser_session_id, user_id) DO UPDATE SET
                subject_type = EXCLUDED.subject_type,
                subject_properties = EXCLUDED.subject_properties,
                client_id = EXCLUDED.client_id,
                refresh_token = EXCLUDED.refresh_token,
                authenticated_at = EXCLUDED.authenticated_at,
                expires_at = EXCLUDED.expires_at,
                is_active = EXCLUDED.is_active
        "#;

        let properties = serde_json::to_string(&account.subject_properties)
            .map_err(|e| StorageError::serialization(format!("encode properties failed: {}", e)))?;

        sqlx::query(QUERY)
            .bind(&account.id)
            .bind(&account.browser_session_id)
            .bind(&account.user_id)
            .bind(&account.subject_type)
            .bind(properties)
            .bind(&account.client_id)
            .bind(&account.refresh_token)
            .bind(account.authenticated_at)
            .bind(account.expires_at)
            .bind(account.is_active)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to upsert account session", e))?;

        Ok(())
    }

    async fn delete_account_session(
        &self,
        browser_session_id: &str,
        user_id: &str,
    ) -> Result<(), StorageError> {
        const QUERY: &str = r#"
            DELETE FROM account_sessions
            WHERE browser_session_id = $1 AND user_id = $2
        "#;

        sqlx::query(QUERY)
            .bind(browser_session_id)
            .bind(user_id)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to delete account session", e))?;

        Ok(())
    }

    async fn delete_browser_session(
        &self,
        session_id: &str,
        tenant_id: &str,
    ) -> Result<u64, StorageError> {
        const DELETE_ACCOUNTS: &str = r#"
            DELETE FROM account_sessions
            WHERE browser_session_id IN (
                SELECT id FROM browser_sessions WHERE id = $1 AND tenant_id = $2
            )
        "#;
        const DELETE_SESSION: &str = r#"
            DELETE FROM browser_sessions WHERE id = $1 AND tenant_id = $2
        "#;

        let accounts = sqlx::query(DELETE_ACCOUNTS)
            .bind(session_id)
            .bind(tenant_id)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to cascade account sessions", e))?;

        sqlx::query(DELETE_SESSION)
            .bind(session_id)
            .bind(tenant_id)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to delete browser session", e))?;

        Ok(accounts.rows_affected())
    }

    async fn list_user_sessions(
        &self,
        user_id: &str,
        tenant_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserSessionRow>, StorageError> {
        const QUERY: &str = r#"
            SELECT
                b.id, b.tenant_id, b.created_at, b.last_activity, b.expires_at,
                b.user_agent, b.ip_address, b.active_user_id, b.version,
                a.id AS account_id, a.browser_session_id, a.user_id, a.subject_type,
                a.subject_properties, a.client_id, a.refresh_token,
                a.authenticated_at, a.expires_at AS account_expires_at, a.is_active
            FROM account_sessions a
            JOIN browser_sessions b ON b.id = a.browser_session_id
            WHERE a.user_id = $1 AND b.tenant_id = $2
            ORDER BY a.authenticated_at DESC
            LIMIT $3 OFFSET $4
        "#;

        let rows = sqlx::query(QUERY)
            .bind(user_id)
            .bind(tenant_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to list user sessions", e))?;

        rows.into_iter()
            .map(|row| {
                let browser = BrowserSessionRow {
                    id: row.get("id"),
                    tenant_id: row.get("tenant_id"),
                    created_at: row.get("created_at"),
                    last_activity: row.get("last_activity"),
                    expires_at: row.get("expires_at"),
                    user_agent: row.get("user_agent"),
                    ip_address: row.get("ip_address"),
                    active_user_id: row.get("active_user_id"),
                    version: row.get("version"),
                };
                let account = AccountSessionRow {
                    id: row.get("account_id"),
                    browser_session_id: row.get("browser_session_id"),
                    user_id: row.get("user_id"),
                    subject_type: row.get("subject_type"),
                    subject_properties: row.get("subject_properties"),
                    client_id: row.get("client_id"),
                    refresh_token: row.get("refresh_token"),
                    authenticated_at: row.get("authenticated_at"),
                    expires_at: row.get("account_expires_at"),
                    is_active: row.get("is_active"),
                };
                Ok(UserSessionRow {
                    browser: browser.into_domain(),
                    account: account.into_domain()?,
                })
            })
            .collect()
    }

    async fn list_tenant_sessions(
        &self,
        tenant_id: &str,
        active_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BrowserSession>, StorageError> {
        const QUERY: &str = r#"
            SELECT id, tenant_id, created_at, last_activity, expires_at,
                   user_agent, ip_address, active_user_id, version
            FROM browser_sessions
            WHERE tenant_id = $1
              AND ($2 = FALSE OR last_activity > $3)
            ORDER BY last_activity DESC
            LIMIT $4 OFFSET $5
        "#;

        let activity_floor = Utc::now() - Duration::days(7);
        let rows = sqlx::query_as::<_, BrowserSessionRow>(QUERY)
            .bind(tenant_id)
            .bind(active_only)
            .bind(activity_floor)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to list tenant sessions", e))?;

        Ok(rows.into_iter().map(BrowserSessionRow::into_domain).collect())
    }

    async fn delete_user_sessions(
        &self,
        user_id: &str,
        tenant_id: &str,
    ) -> Result<u64, StorageError> {
        const AFFECTED: &str = r#"
            SELECT DISTINCT a.browser_session_id
            FROM account_sessions a
            JOIN browser_sessions b ON b.id = a.browser_session_id
            WHERE a.user_id = $1 AND b.tenant_id = $2
        "#;
        const DELETE_ACCOUNTS: &str = r#"
            DELETE FROM account_sessions WHERE browser_session_id = ANY($1)
        "#;
        const DELETE_SESSIONS: &str = r#"
            DELETE FROM browser_sessions WHERE id = ANY($1)
        "#;

        let affected: Vec<String> = sqlx::query_scalar(AFFECTED)
            .bind(user_id)
            .bind(tenant_id)
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to find user sessions", e))?;

        if affected.is_empty() {
            return Ok(0);
        }

        sqlx::query(DELETE_ACCOUNTS)
            .bind(&affected)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to cascade account sessions", e))?;

        let sessions = sqlx::query(DELETE_SESSIONS)
            .bind(&affected)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to delete user browser sessions", e))?;

        Ok(sessions.rows_affected())
    }

    async fn expired_sessions(
        &self,
        max_age_ms: i64,
        limit: Option<i64>,
    ) -> Result<Vec<BrowserSession>, StorageError> {
        const QUERY: &str = r#"
            SELECT id, tenant_id, created_at, last_activity, expires_at,
                   user_agent, ip_address, active_user_id, version
            FROM browser_sessions
            WHERE last_activity < $1
            ORDER BY last_activity ASC
            LIMIT $2
        "#;

        let cutoff = Utc::now() - Duration::milliseconds(max_age_ms);
        let rows = sqlx::query_as::<_, BrowserSessionRow>(QUERY)
            .bind(cutoff)
            .bind(limit.unwrap_or(1000))
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to query expired sessions", e))?;

        Ok(rows.into_iter().map(BrowserSessionRow::into_domain).collect())
    }

    async fn cleanup_expired(&self, max_age_ms: i64) -> Result<u64, StorageError> {
        const DELETE_ACCOUNTS: &str = r#"
            DELETE FROM account_sessions
            WHERE browser_session_id IN (
                SELECT id FROM browser_sessions WHERE last_activity < $1
            )
        "#;
        const DELETE_SESSIONS: &str = r#"
            DELETE FROM browser_sessions WHERE last_activity < $1
        "#;

        let cutoff = Utc::now() - Duration::milliseconds(max_age_ms);

        sqlx::query(DELETE_ACCOUNTS)
            .bind(cutoff)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to cascade expired accounts", e))?;

        let sessions = sqlx::query(DELETE_SESSIONS)
            .bind(cutoff)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to delete expired sessions", e))?;

        Ok(sessions.rows_affected())
    }

    async fn session_stats(&self, tenant_id: Option<&str>) -> Result<SessionStats, StorageError> {
        const QUERY: &str = r#"
            SELECT
                (SELECT COUNT(*) FROM browser_sessions b
                 WHERE $1::text IS NULL OR b.tenant_id = $1) AS total_browser,
                (SELECT COUNT(*) FROM account_sessions a
                 JOIN browser_sessions b ON b.id = a.browser_session_id
                 WHERE $1::text IS NULL OR b.tenant_id = $1) AS total_accounts,
                (SELECT COUNT(*) FROM browser_sessions b
                 WHERE (b.last_activity > $2)
                   AND ($1::text IS NULL OR b.tenant_id = $1)) AS active_24h,
                (SELECT COUNT(DISTINCT a.user_id) FROM account_sessions a
                 JOIN browser_sessions b ON b.id = a.browser_session_id
                 WHERE $1::text IS NULL OR b.tenant_id = $1) AS unique_users
        "#;

        let floor = Utc::now() - Duration::hours(24);
        let row = sqlx::query(QUERY)
            .bind(tenant_id)
            .bind(floor)
            .fetch_one(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to compute session stats", e))?;

        Ok(SessionStats {
            total_browser_sessions: row.get::<i64, _>("total_browser").max(0) as u64,
            total_account_sessions: row.get::<i64, _>("total_accounts").max(0) as u64,
            active_sessions_last_24h: row.get::<i64, _>("active_24h").max(0) as u64,
            unique_users: row.get::<i64, _>("unique_users").max(0) as u64,
        })
    }
}
