//! Document backend trait and the `Record` bound shared by every collection.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DatabaseError;

/// A persistable top-level entity.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection (table / namespace) name in the primary backend.
    const COLLECTION: &'static str;

    /// Opaque unique identifier within the collection.
    fn id(&self) -> &str;
}

/// Backend-agnostic document store: JSON documents grouped by collection,
/// addressed by id, returned in insertion order.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Short backend name for logs and status output.
    fn name(&self) -> &str;

    /// Cheap connectivity check.
    async fn ping(&self) -> Result<(), DatabaseError>;

    /// Insert a new document. Fails if the id already exists.
    async fn insert(&self, collection: &str, id: &str, doc: &Value) -> Result<(), DatabaseError>;

    /// Insert or replace a document.
    async fn upsert(&self, collection: &str, id: &str, doc: &Value) -> Result<(), DatabaseError>;

    /// All documents in a collection.
    async fn find_all(&self, collection: &str) -> Result<Vec<Value>, DatabaseError>;

    /// A single document by id.
    async fn find_one(&self, collection: &str, id: &str) -> Result<Option<Value>, DatabaseError>;

    /// Replace an existing document. Returns false if the id was absent.
    async fn replace(&self, collection: &str, id: &str, doc: &Value) -> Result<bool, DatabaseError>;

    /// Delete a document. Returns false if the id was absent.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, DatabaseError>;

    /// Delete several documents. Returns how many existed.
    async fn delete_many(&self, collection: &str, ids: &[String]) -> Result<usize, DatabaseError>;
}
