/// Raw database rows mirroring browser and account sessions.
///
/// These map to the `browser_sessions` and `account_sessions` tables.
/// They are NOT domain entities: purely for database row deserialization.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::core::error::StorageError;
use crate::core::session::{AccountSession, BrowserSession};

#[derive(Debug, Clone, FromRow)]
pub struct BrowserSessionRow {
    /// Session identifier (primary key)
    pub id: String,
    /// Owning tenant (indexed; every admin query binds it)
    pub tenant_id: String,
    pub created_at: DateTime<Utc>,
    /// Sliding-window marker (indexed for activity filters)
    pub last_activity: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub user_agent: String,
    pub ip_address: String,
    /// User of the active account session, NULL when none
    pub active_user_id: Option<String>,
    pub version: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct AccountSessionRow {
    pub id: String,
    /// Parent browser session (indexed, unique with user_id)
    pub browser_session_id: String,
    pub user_id: String,
    pub subject_type: String,
    /// JSON text; kept opaque at the SQL layer
    pub subject_properties: String,
    pub client_id: String,
    pub refresh_token: String,
    pub authenticated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
}

impl BrowserSessionRow {
    pub fn into_domain(self) -> BrowserSession {
        BrowserSession {
            id: self.id,
            tenant_id: self.tenant_id,
            created_at: self.created_at,
            last_activity: self.last_activity,
            expires_at: self.expires_at,
            user_agent: self.user_agent,
            ip_address: self.ip_address,
            active_user_id: self.active_user_id,
            version: self.version.max(0) as u64,
        }
    }
}

impl AccountSessionRow {
    pub fn into_domain(self) -> Result<AccountSession, StorageError> {
        let subject_properties = serde_json::from_str(&self.subject_properties)
            .map_err(|e| StorageError::serialization(format!("corrupt subject properties: {}", e)))?;
        Ok(AccountSession {
            id: self.id,
            browser_session_id: self.browser_session_id,
            user_id: self.user_id,
            subject_type: self.subject_type,
            subject_properties,
            client_id: self.client_id,
            refresh_token: self.refresh_token,
            authenticated_at: self.authenticated_at,
            expires_at: self.expires_at,
            is_active: self.is_active,
        })
    }
}
