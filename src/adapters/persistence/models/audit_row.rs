/// Raw database row for the audit trail (`token_usage`).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::core::audit::{AuditEventType, AuditRecord};
use crate::core::error::StorageError;

#[derive(Debug, Clone, FromRow)]
pub struct AuditRow {
    pub token_id: String,
    pub subject: String,
    /// One of generated / refreshed / revoked / reused
    pub event_type: String,
    pub client_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// JSON text, NULL when absent
    pub metadata: Option<String>,
}

impl AuditRow {
    pub fn into_domain(self) -> Result<AuditRecord, StorageError> {
        let event_type = match self.event_type.as_str() {
            "generated" => AuditEventType::Generated,
            "refreshed" => AuditEventType::Refreshed,
            "revoked" => AuditEventType::Revoked,
            "reused" => AuditEventType::Reused,
            other => {
                return Err(StorageError::serialization(format!(
                    "unknown audit event type: {}",
                    other
                )))
            }
        };
        let metadata = match self.metadata {
            Some(text) => Some(serde_json::from_str(&text).map_err(|e| {
                StorageError::serialization(format!("corrupt audit metadata: {}", e))
            })?),
            None => None,
        };
        Ok(AuditRecord {
            token_id: self.token_id,
            subject: self.subject,
            event_type,
            client_id: self.client_id,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            timestamp: self.timestamp,
            metadata,
        })
    }
}
