/// SQL-backed implementation of the audit sink.
///
/// Implements operations against the audit table (`token_usage` by
/// default). The table identifier is caller-configurable and therefore
/// validated against the allow-list before it is ever interpolated into
/// SQL text; all values still bind as parameters.

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::adapters::persistence::database::Database;
use crate::adapters::persistence::models::AuditRow;
use crate::adapters::persistence::tables::validate_table;
use crate::core::audit::AuditRecord;
use crate::core::error::StorageError;
use crate::core::usecases::ports::{AuditFilter, AuditSink};

pub struct AuditSinkSql {
    db: Database,
    table: String,
}

impl AuditSinkSql {
    /// Build a sink over `table`, which must pass the allow-list.
    pub fn new(db: Database, table: &str) -> Result<Self, StorageError> {
        let table = validate_table(table)?.to_string();
        Ok(Self { db, table })
    }

    fn query_failed(what: &str, e: sqlx::Error) -> StorageError {
        StorageError::unavailable(format!("{}: {}", what, e))
    }

    fn encode_metadata(record: &AuditRecord) -> Result<Option<String>, StorageError> {
        record
            .metadata
            .as_ref()
            .map(|m| {
                serde_json::to_string(m).map_err(|e| {
                    StorageError::serialization(format!("encode audit metadata failed: {}", e))
                })
            })
            .transpose()
    }
}

#[async_trait]
impl AuditSink for AuditSinkSql {
    async fn insert(&self, record: &AuditRecord) -> Result<(), StorageError> {
        let query = format!(
            r#"
            INSERT INTO {}
            (token_id, subject, event_type, client_id, ip_address, user_agent, timestamp, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
            self.table
        );

        sqlx::query(&query)
            .bind(&record.token_id)
            .bind(&record.subject)
            .bind(record.event_type.as_str())
            .bind(&record.client_id)
            .bind(&record.ip_address)
            .bind(&record.user_agent)
            .bind(record.timestamp)
            .bind(Self::encode_metadata(record)?)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to insert audit record", e))?;

        Ok(())
    }

    async fn insert_batch(&self, records: &[AuditRecord]) -> Result<(), StorageError> {
        // Batches are small (queue drain); per-row inserts keep this simple.
        for record in records {
            self.insert(record).await?;
        }
        Ok(())
    }

    async fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>, StorageError> {
        let query = format!(
            r#"
            SELECT token_id, subject, event_type, client_id, ip_address, user_agent,
                   timestamp, metadata
            FROM {}
            WHERE ($1::text IS NULL OR subject = $1)
              AND ($2::text IS NULL OR token_id = $2)
              AND ($3::text IS NULL OR client_id = $3)
              AND ($4::text IS NULL OR event_type = $4)
            ORDER BY timestamp DESC
            LIMIT $5
            "#,
            self.table
        );

        let rows = sqlx::query_as::<_, AuditRow>(&query)
            .bind(&filter.subject)
            .bind(&filter.token_id)
            .bind(&filter.client_id)
            .bind(filter.event_type.map(|e| e.as_str()))
            .bind(filter.limit.unwrap_or(100))
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to query audit records", e))?;

        rows.into_iter().map(AuditRow::into_domain).collect()
    }

    async fn cleanup(&self, retention_days: i64) -> Result<u64, StorageError> {
        let query = format!("DELETE FROM {} WHERE timestamp < $1", self.table);
        let cutoff = Utc::now() - Duration::days(retention_days);

        let result = sqlx::query(&query)
            .bind(cutoff)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to clean up audit records", e))?;

        Ok(result.rows_affected())
    }
}
