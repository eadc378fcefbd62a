//! Port for the audit trail.
//!
//! The audit service decides delivery (direct vs queued) and swallows
//! failures; this port is the raw table access underneath it. Queries
//! degrade to empty results on error at the service layer.

use async_trait::async_trait;

use crate::core::audit::{AuditEventType, AuditRecord};
use crate::core::error::StorageError;

/// Filter for audit scans. All fields are conjunctive; `None` matches all.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub subject: Option<String>,
    pub token_id: Option<String>,
    pub client_id: Option<String>,
    pub event_type: Option<AuditEventType>,
    pub limit: Option<i64>,
}

/// Contract for audit persistence.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Insert one record.
    async fn insert(&self, record: &AuditRecord) -> Result<(), StorageError>;

    /// Insert a batch (queue-mode consumer).
    async fn insert_batch(&self, records: &[AuditRecord]) -> Result<(), StorageError>;

    /// Filtered scan, newest first.
    async fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>, StorageError>;

    /// Remove records older than `retention_days`. Returns rows removed.
    async fn cleanup(&self, retention_days: i64) -> Result<u64, StorageError>;
}
