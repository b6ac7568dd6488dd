//! Placeholder backend that fails every call.
//!
//! Installed when the configured database cannot be opened at startup, so
//! every store runs on its fallback while status probes still report why.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DatabaseError;
use crate::store::traits::DocumentBackend;

pub struct UnavailableBackend {
    reason: String,
}

impl UnavailableBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> Result<T, DatabaseError> {
        Err(DatabaseError::Unavailable(self.reason.clone()))
    }
}

#[async_trait]
impl DocumentBackend for UnavailableBackend {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.fail()
    }

    async fn insert(&self, _: &str, _: &str, _: &Value) -> Result<(), DatabaseError> {
        self.fail()
    }

    async fn upsert(&self, _: &str, _: &str, _: &Value) -> Result<(), DatabaseError> {
        self.fail()
    }

    async fn find_all(&self, _: &str) -> Result<Vec<Value>, DatabaseError> {
        self.fail()
    }

    async fn find_one(&self, _: &str, _: &str) -> Result<Option<Value>, DatabaseError> {
        self.fail()
    }

    async fn replace(&self, _: &str, _: &str, _: &Value) -> Result<bool, DatabaseError> {
        self.fail()
    }

    async fn delete(&self, _: &str, _: &str) -> Result<bool, DatabaseError> {
        self.fail()
    }

    async fn delete_many(&self, _: &str, _: &[String]) -> Result<usize, DatabaseError> {
        self.fail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_call_fails_with_reason() {
        let backend = UnavailableBackend::new("connection refused");
        let err = backend.ping().await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
        assert!(backend.find_all("tasks").await.is_err());
        assert!(backend.delete("tasks", "x").await.is_err());
    }
}
