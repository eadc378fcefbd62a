//! Use case: audit trail.
//!
//! Fire-and-forget event recording in two delivery modes: direct (inline
//! SQL write) and queued (tokio mpsc, consumer batches inserts). Failures
//! are caught and counted, never surfaced to callers; a rolling sensor
//! warns when the failure rate crosses 10 % over at least 100 operations.
//! Queries degrade to empty results on error.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

use crate::core::audit::{AuditEnvelope, AuditEventType, AuditRecord};
use crate::core::usecases::ports::{AuditFilter, AuditSink};

const SENSOR_WINDOW: u64 = 100;
const SENSOR_THRESHOLD_PERCENT: u64 = 10;

/// Rolling failure-rate sensor. Counts reset each window; a breach inside
/// a closed window emits one warning.
struct FailureSensor {
    ops: AtomicU64,
    failures: AtomicU64,
}

impl FailureSensor {
    fn new() -> Self {
        Self {
            ops: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Record one operation; returns the failure percentage when a full
    /// window just closed above the threshold.
    fn record(&self, ok: bool) -> Option<u64> {
        if !ok {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
        let ops = self.ops.fetch_add(1, Ordering::Relaxed) + 1;
        if ops >= SENSOR_WINDOW {
            let failures = self.failures.swap(0, Ordering::Relaxed);
            self.ops.store(0, Ordering::Relaxed);
            let percent = failures * 100 / ops;
            if percent > SENSOR_THRESHOLD_PERCENT {
                return Some(percent);
            }
        }
        None
    }
}

enum Delivery {
    Direct,
    Queued(mpsc::Sender<AuditEnvelope>),
}

pub struct AuditService {
    sink: Arc<dyn AuditSink>,
    delivery: Delivery,
    sensor: FailureSensor,
}

impl AuditService {
    /// Direct mode: each event writes inline.
    pub fn direct(sink: Arc<dyn AuditSink>) -> Self {
        Self {
            sink,
            delivery: Delivery::Direct,
            sensor: FailureSensor::new(),
        }
    }

    /// Queue mode: events are enveloped and published; the returned
    /// receiver feeds [`spawn_consumer`].
    pub fn queued(sink: Arc<dyn AuditSink>, capacity: usize) -> (Self, mpsc::Receiver<AuditEnvelope>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                sink,
                delivery: Delivery::Queued(tx),
                sensor: FailureSensor::new(),
            },
            rx,
        )
    }

    /// Record an event. Never fails, never blocks on the queue.
    pub async fn record(&self, record: AuditRecord) {
        let ok = match &self.delivery {
            Delivery::Direct => match self.sink.insert(&record).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(event = record.event_type.as_str(), error = %e, "audit write failed");
                    false
                }
            },
            Delivery::Queued(tx) => match tx.try_send(AuditEnvelope::wrap(record)) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "audit enqueue failed; event dropped");
                    false
                }
            },
        };

        if let Some(percent) = self.sensor.record(ok) {
            warn!(failure_rate = percent, "audit failure rate above threshold");
        }
    }

    /// Convenience: record a token event for a subject.
    pub async fn record_token_event(
        &self,
        event_type: AuditEventType,
        token_id: &str,
        subject: &str,
        client_id: Option<&str>,
    ) {
        let mut record = AuditRecord::new(token_id, subject, event_type);
        record.client_id = client_id.map(str::to_string);
        self.record(record).await;
    }

    /// Filtered scan; `[]` on error.
    pub async fn query(&self, filter: &AuditFilter) -> Vec<AuditRecord> {
        match self.sink.query(filter).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "audit query failed; returning empty");
                Vec::new()
            }
        }
    }

    /// All events touching one subject's tokens, newest first; `[]` on error.
    pub async fn subject_history(&self, subject: &str, limit: i64) -> Vec<AuditRecord> {
        self.query(&AuditFilter {
            subject: Some(subject.to_string()),
            limit: Some(limit),
            ..Default::default()
        })
        .await
    }

    /// Retention sweep; 0 on error.
    pub async fn cleanup(&self, retention_days: i64) -> u64 {
        match self.sink.cleanup(retention_days).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!(error = %e, "audit cleanup failed");
                0
            }
        }
    }
}

/// Spawn the queue-mode consumer: drains the channel, batching up to
/// `batch_size` inserts per write. Exits when the channel closes.
pub fn spawn_consumer(
    mut rx: mpsc::Receiver<AuditEnvelope>,
    sink: Arc<dyn AuditSink>,
    batch_size: usize,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut batch = Vec::with_capacity(batch_size);
        while let Some(envelope) = rx.recv().await {
            batch.push(envelope.event);
            // Drain whatever else is already queued, up to the batch cap.
            while batch.len() < batch_size {
                match rx.try_recv() {
                    Ok(envelope) => batch.push(envelope.event),
                    Err(_) => break,
                }
            }
            if let Err(e) = sink.insert_batch(&batch).await {
                warn!(count = batch.len(), error = %e, "audit batch insert failed");
            }
            batch.clear();
        }
    })
}
