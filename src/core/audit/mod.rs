// Audit domain: token lifecycle events and the queue envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token lifecycle events worth an audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditEventType {
    /// Tokens minted at code redemption or client-credentials
    Generated,
    /// Refresh-token rotation succeeded
    Refreshed,
    /// Explicit revocation (access or refresh)
    Revoked,
    /// A non-current refresh token was presented; the family was revoked
    Reused,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::Refreshed => "refreshed",
            Self::Revoked => "revoked",
            Self::Reused => "reused",
        }
    }
}

/// One audit event. Written fire-and-forget; loss is acceptable, blocking
/// the caller is not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub token_id: String,
    pub subject: String,
    pub event_type: AuditEventType,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl AuditRecord {
    pub fn new(
        token_id: impl Into<String>,
        subject: impl Into<String>,
        event_type: AuditEventType,
    ) -> Self {
        Self {
            token_id: token_id.into(),
            subject: subject.into(),
            event_type,
            client_id: None,
            ip_address: None,
            user_agent: None,
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    pub fn with_client(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Envelope published to the audit queue in queue mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEnvelope {
    pub version: u32,
    pub event: AuditRecord,
    pub enqueued_at: DateTime<Utc>,
}

impl AuditEnvelope {
    pub fn wrap(event: AuditRecord) -> Self {
        Self {
            version: 1,
            event,
            enqueued_at: Utc::now(),
        }
    }
}
