//! Resilient store: primary document backend with an in-process fallback.
//!
//! Every primary call is bounded by a timeout. Any primary failure (error,
//! timeout, undecodable document) is logged and absorbed, and the call is
//! served from the fallback collection instead. The fallback is not a cache:
//! records written there are never replayed into the primary, so a backend
//! that recovers mid-session does not see them.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::DatabaseError;
use crate::store::traits::{DocumentBackend, Record};

/// Default bound on a single primary backend call.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_millis(1500);

/// A collection of `T` persisted to a primary backend when it answers, and
/// to an insertion-ordered in-process list when it does not.
pub struct ResilientStore<T: Record> {
    primary: Option<Arc<dyn DocumentBackend>>,
    /// Guards every fallback read-modify-write for this collection.
    fallback: Mutex<Vec<T>>,
    timeout: Duration,
}

fn encode<T: Record>(record: &T) -> Result<Value, DatabaseError> {
    serde_json::to_value(record).map_err(|e| DatabaseError::Serialization(e.to_string()))
}

fn decode<T: Record>(doc: Value) -> Result<T, DatabaseError> {
    serde_json::from_value(doc).map_err(|e| DatabaseError::Serialization(e.to_string()))
}

impl<T: Record> ResilientStore<T> {
    /// Create a store over an optional primary backend.
    pub fn new(primary: Option<Arc<dyn DocumentBackend>>, timeout: Duration) -> Self {
        Self {
            primary,
            fallback: Mutex::new(Vec::new()),
            timeout,
        }
    }

    /// A store with no primary backend (fallback only).
    pub fn in_memory() -> Self {
        Self::new(None, DEFAULT_BACKEND_TIMEOUT)
    }

    /// Seed the fallback collection (used for singleton defaults).
    pub fn with_fallback_records(self, records: Vec<T>) -> Self {
        Self {
            fallback: Mutex::new(records),
            ..self
        }
    }

    /// Whether a primary backend is wired in (it may still be unreachable).
    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Run one primary call under the timeout. `None` means the primary
    /// failed and the caller must serve from the fallback.
    async fn attempt<R>(
        &self,
        op: &'static str,
        call: impl Future<Output = Result<R, DatabaseError>>,
    ) -> Option<R> {
        let outcome = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(DatabaseError::Timeout(self.timeout)),
        };
        match outcome {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(
                    collection = T::COLLECTION,
                    op,
                    error = %e,
                    "Primary backend failed, using in-process fallback"
                );
                None
            }
        }
    }

    /// Persist a new record and return it. Never fails.
    pub async fn create(&self, record: T) -> T {
        if let Some(backend) = &self.primary {
            let written = self
                .attempt("create", async {
                    let doc = encode(&record)?;
                    backend.insert(T::COLLECTION, record.id(), &doc).await
                })
                .await;
            if written.is_some() {
                debug!(collection = T::COLLECTION, id = record.id(), "Record created");
                return record;
            }
        }

        let mut fallback = self.fallback.lock().await;
        fallback.push(record.clone());
        debug!(collection = T::COLLECTION, id = record.id(), "Record created in fallback");
        record
    }

    /// Insert or replace a record by id. Never fails.
    pub async fn put(&self, record: T) -> T {
        if let Some(backend) = &self.primary {
            let written = self
                .attempt("put", async {
                    let doc = encode(&record)?;
                    backend.upsert(T::COLLECTION, record.id(), &doc).await
                })
                .await;
            if written.is_some() {
                return record;
            }
        }

        let mut fallback = self.fallback.lock().await;
        match fallback.iter_mut().find(|r| r.id() == record.id()) {
            Some(existing) => *existing = record.clone(),
            None => fallback.push(record.clone()),
        }
        record
    }

    /// All records, from whichever source responds. The two are never merged.
    pub async fn list(&self) -> Vec<T> {
        if let Some(backend) = &self.primary {
            let docs = self
                .attempt("list", async {
                    backend
                        .find_all(T::COLLECTION)
                        .await?
                        .into_iter()
                        .map(decode::<T>)
                        .collect::<Result<Vec<_>, _>>()
                })
                .await;
            if let Some(records) = docs {
                return records;
            }
        }

        self.fallback.lock().await.clone()
    }

    /// A single record. A primary miss also consults the fallback, so records
    /// written during an outage stay addressable.
    pub async fn get(&self, id: &str) -> Option<T> {
        if let Some(backend) = &self.primary {
            let found = self
                .attempt("get", async {
                    match backend.find_one(T::COLLECTION, id).await? {
                        Some(doc) => decode::<T>(doc).map(Some),
                        None => Ok(None),
                    }
                })
                .await
                .flatten();
            if found.is_some() {
                return found;
            }
        }

        self.fallback
            .lock()
            .await
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    /// Read-modify-write. `mutate` may run twice (primary attempt, then the
    /// fallback copy) so it must be a plain field assignment or append.
    /// Returns `None` when neither store holds the id.
    pub async fn update<F>(&self, id: &str, mutate: F) -> Option<T>
    where
        F: Fn(&mut T) + Send + Sync,
    {
        // Held across the primary attempt too, so concurrent updates of one
        // collection never interleave inside this process.
        let mut fallback = self.fallback.lock().await;

        if let Some(backend) = &self.primary {
            let updated = self
                .attempt("update", async {
                    let Some(doc) = backend.find_one(T::COLLECTION, id).await? else {
                        return Ok(None);
                    };
                    let mut record = decode::<T>(doc)?;
                    mutate(&mut record);
                    let changed = backend.replace(T::COLLECTION, id, &encode(&record)?).await?;
                    Ok(changed.then_some(record))
                })
                .await
                .flatten();
            if updated.is_some() {
                debug!(collection = T::COLLECTION, id, "Record updated");
                return updated;
            }
        }

        let record = fallback.iter_mut().find(|r| r.id() == id)?;
        mutate(record);
        Some(record.clone())
    }

    /// Remove a record. True iff it existed in whichever store served the call.
    pub async fn delete(&self, id: &str) -> bool {
        if let Some(backend) = &self.primary {
            let deleted = self
                .attempt("delete", backend.delete(T::COLLECTION, id))
                .await;
            if deleted == Some(true) {
                debug!(collection = T::COLLECTION, id, "Record deleted");
                return true;
            }
        }

        let mut fallback = self.fallback.lock().await;
        let before = fallback.len();
        fallback.retain(|r| r.id() != id);
        fallback.len() != before
    }

    /// Remove every record matching `predicate`; returns how many were removed.
    ///
    /// If the primary bulk delete fails, the primary is re-read and the
    /// matching ids that are gone are counted, so a partial delete is still
    /// reported.
    pub async fn purge<P>(&self, predicate: P) -> usize
    where
        P: Fn(&T) -> bool + Send + Sync,
    {
        if let Some(backend) = &self.primary {
            let matching = self
                .attempt("purge", async {
                    let records = backend
                        .find_all(T::COLLECTION)
                        .await?
                        .into_iter()
                        .map(decode::<T>)
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(records
                        .into_iter()
                        .filter(|r| predicate(r))
                        .map(|r| r.id().to_string())
                        .collect::<Vec<_>>())
                })
                .await;
            if let Some(ids) = matching {
                if let Some(count) = self
                    .attempt("purge", backend.delete_many(T::COLLECTION, &ids))
                    .await
                {
                    return count;
                }
                let recount = self.attempt("purge recount", primary_ids::<T>(backend.as_ref()));
                if let Some(remaining) = recount.await {
                    let gone = ids.iter().filter(|id| !remaining.contains(*id)).count();
                    warn!(
                        collection = T::COLLECTION,
                        removed = gone,
                        "Primary purge was partial"
                    );
                    return gone;
                }
            }
        }

        let mut fallback = self.fallback.lock().await;
        let before = fallback.len();
        fallback.retain(|r| !predicate(r));
        before - fallback.len()
    }

}

async fn primary_ids<T: Record>(
    backend: &dyn DocumentBackend,
) -> Result<Vec<String>, DatabaseError> {
    backend
        .find_all(T::COLLECTION)
        .await?
        .into_iter()
        .map(|doc| decode::<T>(doc).map(|r| r.id().to_string()))
        .collect()
}


#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::test_support::{HangingBackend, PartialDeleteBackend, SwitchableBackend};
    use super::*;
    use crate::store::UnavailableBackend;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        text: String,
    }

    impl Record for Note {
        const COLLECTION: &'static str = "notes";
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn note(id: &str, text: &str) -> Note {
        Note {
            id: id.into(),
            text: text.into(),
        }
    }

    fn ids(records: &[Note]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    fn unavailable_store() -> ResilientStore<Note> {
        ResilientStore::new(
            Some(Arc::new(UnavailableBackend::new("down"))),
            DEFAULT_BACKEND_TIMEOUT,
        )
    }

    async fn exercise_crud(store: &ResilientStore<Note>) {
        store.create(note("a", "one")).await;
        store.create(note("b", "two")).await;
        assert_eq!(ids(&store.list().await), vec!["a", "b"]);

        let updated = store.update("a", |n| n.text = "uno".into()).await.unwrap();
        assert_eq!(updated.text, "uno");
        assert_eq!(store.get("a").await.unwrap().text, "uno");
        assert!(store.update("zzz", |n| n.text = "x".into()).await.is_none());

        assert!(store.delete("b").await);
        assert!(!store.delete("b").await);
        assert_eq!(ids(&store.list().await), vec!["a"]);
    }

    #[tokio::test]
    async fn crud_with_healthy_primary() {
        let backend = SwitchableBackend::new().await;
        let store = ResilientStore::new(Some(backend.clone()), DEFAULT_BACKEND_TIMEOUT);
        exercise_crud(&store).await;

        // Everything landed in the primary, nothing in the fallback.
        assert_eq!(backend.find_all("notes").await.unwrap().len(), 1);
        assert!(store.fallback.lock().await.is_empty());
    }

    #[tokio::test]
    async fn crud_with_unavailable_primary() {
        exercise_crud(&unavailable_store()).await;
    }

    #[tokio::test]
    async fn crud_without_primary() {
        let store = ResilientStore::<Note>::in_memory();
        assert!(!store.has_primary());
        exercise_crud(&store).await;
    }

    #[tokio::test]
    async fn timeout_counts_as_failure() {
        let store = ResilientStore::<Note>::new(
            Some(Arc::new(HangingBackend)),
            Duration::from_millis(20),
        );
        store.create(note("a", "one")).await;
        assert_eq!(ids(&store.list().await), vec!["a"]);
        assert!(store.get("a").await.is_some());
    }

    #[tokio::test]
    async fn outage_writes_are_not_reconciled() {
        let backend = SwitchableBackend::new().await;
        let store = ResilientStore::new(Some(backend.clone()), DEFAULT_BACKEND_TIMEOUT);

        store.create(note("before", "p")).await;

        backend.set_up(false);
        store.create(note("during", "f")).await;
        assert_eq!(ids(&store.list().await), vec!["during"]);

        backend.set_up(true);
        // Primary is authoritative again and never learned about "during".
        assert_eq!(ids(&store.list().await), vec!["before"]);
        assert!(backend.find_one("notes", "during").await.unwrap().is_none());

        // But the outage record is still addressable by id.
        assert_eq!(store.get("during").await.unwrap().text, "f");
        let updated = store.update("during", |n| n.text = "g".into()).await.unwrap();
        assert_eq!(updated.text, "g");
        assert!(store.delete("during").await);
        assert!(store.get("during").await.is_none());
    }

    #[tokio::test]
    async fn put_upserts_in_both_modes() {
        let backend = SwitchableBackend::new().await;
        let store = ResilientStore::new(Some(backend.clone()), DEFAULT_BACKEND_TIMEOUT);
        store.put(note("default", "v1")).await;
        store.put(note("default", "v2")).await;
        assert_eq!(store.list().await, vec![note("default", "v2")]);

        let offline = unavailable_store();
        offline.put(note("default", "v1")).await;
        offline.put(note("default", "v2")).await;
        assert_eq!(offline.list().await, vec![note("default", "v2")]);
    }

    #[tokio::test]
    async fn fallback_seed_is_served_during_outage() {
        let store = unavailable_store().with_fallback_records(vec![note("default", "seed")]);
        assert_eq!(store.get("default").await.unwrap().text, "seed");
    }

    #[tokio::test]
    async fn purge_removes_matching_records() {
        let backend = SwitchableBackend::new().await;
        let store = ResilientStore::new(Some(backend.clone()), DEFAULT_BACKEND_TIMEOUT);
        for (id, text) in [("a", "old"), ("b", "new"), ("c", "old")] {
            store.create(note(id, text)).await;
        }
        assert_eq!(store.purge(|n| n.text == "old").await, 2);
        assert_eq!(ids(&store.list().await), vec!["b"]);

        let offline = unavailable_store();
        offline.create(note("x", "old")).await;
        offline.create(note("y", "new")).await;
        assert_eq!(offline.purge(|n| n.text == "old").await, 1);
        assert_eq!(ids(&offline.list().await), vec!["y"]);
    }

    #[tokio::test]
    async fn partial_primary_purge_reports_removed_rows() {
        let backend = PartialDeleteBackend::new().await;
        let store = ResilientStore::new(Some(backend.clone()), DEFAULT_BACKEND_TIMEOUT);
        for (id, text) in [("a", "old"), ("b", "new"), ("c", "old")] {
            store.create(note(id, text)).await;
        }
        assert_eq!(store.purge(|n| n.text == "old").await, 1);
        assert_eq!(ids(&store.list().await), vec!["b", "c"]);
    }

    #[tokio::test]
    async fn undecodable_primary_document_falls_back() {
        let backend = SwitchableBackend::new().await;
        backend
            .insert("notes", "bad", &serde_json::json!({"unexpected": true}))
            .await
            .unwrap();
        let store = ResilientStore::<Note>::new(Some(backend.clone()), DEFAULT_BACKEND_TIMEOUT);
        // The primary listing cannot be decoded, so the (empty) fallback answers.
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn concurrent_fallback_appends_are_not_lost() {
        #[derive(Debug, Clone, Serialize, Deserialize)]
        struct Counter {
            id: String,
            hits: Vec<u32>,
        }
        impl Record for Counter {
            const COLLECTION: &'static str = "counters";
            fn id(&self) -> &str {
                &self.id
            }
        }

        let store = Arc::new(ResilientStore::<Counter>::in_memory());
        store
            .create(Counter {
                id: "c".into(),
                hits: vec![],
            })
            .await;

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.update("c", |c| c.hits.push(i)).await;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(store.get("c").await.unwrap().hits.len(), 32);
    }
}
