//! Audit Recorder: one `operation_logs` row per successful mutation.
//!
//! Writes are best effort. A failed audit insert is logged and counted, and
//! the mutation that triggered it still succeeds.

use crate::entities::ActionKind;
use crate::locale;
use crate::policy::EntityKind;
use crate::store::{RowStore, StoreError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub actor: Uuid,
    pub kind: ActionKind,
    pub entity: EntityKind,
    pub label: String,
    pub record_id: Option<String>,
    /// Snapshot of the submitted fields. Deletes carry none.
    pub details: Option<Value>,
}

impl AuditEntry {
    pub fn new(actor: Uuid, kind: ActionKind, entity: EntityKind, record_id: impl ToString) -> Self {
        Self {
            actor,
            kind,
            entity,
            label: locale::action_label(kind, entity),
            record_id: Some(record_id.to_string()),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn table(&self) -> &'static str {
        self.entity.table()
    }

    fn to_row(&self) -> Value {
        json!({
            "user_id": self.actor,
            "action": self.label,
            "action_kind": self.kind,
            "table_name": self.table(),
            "record_id": self.record_id,
            "details": self.details,
        })
    }
}

#[async_trait]
pub trait AuditRecorder: Send + Sync {
    async fn record(&self, token: &str, entry: &AuditEntry) -> Result<(), StoreError>;
}

/// Appends to `operation_logs` with the caller's token.
pub struct StoreAuditRecorder {
    store: Arc<dyn RowStore>,
}

impl StoreAuditRecorder {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuditRecorder for StoreAuditRecorder {
    async fn record(&self, token: &str, entry: &AuditEntry) -> Result<(), StoreError> {
        self.store
            .insert(token, EntityKind::OperationLogs.table(), entry.to_row())
            .await?;
        Ok(())
    }
}

pub async fn record_best_effort(recorder: &dyn AuditRecorder, token: &str, entry: &AuditEntry) {
    match recorder.record(token, entry).await {
        Ok(()) => {
            tracing::debug!(
                table = entry.table(),
                action = %entry.kind,
                record_id = ?entry.record_id,
                "audit entry recorded"
            );
        }
        Err(e) => {
            metrics::counter!("aidboard_audit_failures_total", "table" => entry.table())
                .increment(1);
            tracing::warn!(
                error = %e,
                table = entry.table(),
                action = %entry.kind,
                record_id = ?entry.record_id,
                "audit write failed"
            );
        }
    }
}
