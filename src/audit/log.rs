//! Audit events and the log that stores them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::store::{Record, ResilientStore};

/// Default number of events returned by a listing.
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// A single audit event. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: String,
    pub event_type: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub meta: Map<String, Value>,
}

impl AuditEvent {
    pub fn new(
        event_type: impl Into<String>,
        message: impl Into<String>,
        meta: Map<String, Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_type: event_type.into(),
            message: message.into(),
            timestamp: Utc::now(),
            meta,
        }
    }
}

impl Record for AuditEvent {
    const COLLECTION: &'static str = "audit_events";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Audit log over a resilient store.
pub struct AuditLog {
    store: ResilientStore<AuditEvent>,
}

impl AuditLog {
    pub fn new(store: ResilientStore<AuditEvent>) -> Self {
        Self { store }
    }

    /// Record an event. Never fails.
    pub async fn log(
        &self,
        event_type: impl Into<String>,
        message: impl Into<String>,
        meta: Map<String, Value>,
    ) -> AuditEvent {
        self.store.create(AuditEvent::new(event_type, message, meta)).await
    }

    /// Record an event whose meta is a `json!({...})` literal.
    pub async fn record(
        &self,
        event_type: &str,
        message: impl Into<String>,
        meta: Value,
    ) -> AuditEvent {
        let meta = match meta {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.log(event_type, message, meta).await
    }

    /// Up to `limit` events, newest first.
    pub async fn recent(&self, limit: usize) -> Vec<AuditEvent> {
        let mut events = self.store.list().await;
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events.truncate(limit);
        events
    }

    /// Remove events older than `retention_days`. Returns how many were removed.
    pub async fn cleanup(&self, retention_days: u32) -> usize {
        self.cleanup_before(Utc::now() - Duration::days(i64::from(retention_days)))
            .await
    }

    /// Remove events strictly older than `cutoff`.
    pub async fn cleanup_before(&self, cutoff: DateTime<Utc>) -> usize {
        let removed = self.store.purge(|e| e.timestamp < cutoff).await;
        info!(removed, cutoff = %cutoff, "Audit retention cleanup");
        removed
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn audit_log() -> AuditLog {
        AuditLog::new(ResilientStore::in_memory())
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_limited() {
        let log = audit_log();
        for i in 0..5 {
            log.record("test.event", format!("event {i}"), json!({"i": i})).await;
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        let events = log.recent(3).await;
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].message, "event 4");
        assert_eq!(events[2].message, "event 2");
        assert_eq!(events[0].meta["i"], 4);
    }

    #[tokio::test]
    async fn cleanup_removes_only_old_events() {
        let log = audit_log();
        let mut old = AuditEvent::new("task.create", "old", Map::new());
        old.timestamp = Utc::now() - Duration::days(400);
        log.store.create(old).await;
        log.record("task.create", "fresh", json!({})).await;

        assert_eq!(log.cleanup(365).await, 1);
        let remaining = log.recent(DEFAULT_LIST_LIMIT).await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].message, "fresh");
        assert_eq!(log.cleanup(365).await, 0);
    }

    #[tokio::test]
    async fn non_object_meta_becomes_empty() {
        let event = audit_log().record("x.y", "msg", json!("scalar")).await;
        assert!(event.meta.is_empty());
    }
}
